use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::media::MediaResolver;
use crate::api::payload::Payload;
use crate::config::AppConfig;
use crate::error::{ApiError, FailureKind};
use crate::session::{Navigator, Session, SessionGuard, TokenStore};

/// HTTP client bound to one session.
///
/// Headers are configured per instance from the [`Session`] handed in at
/// construction, never through shared defaults, so two clients holding
/// different credentials can live side by side. Every request races the
/// client's [`CancellationToken`]; a 401 from any call clears the stored token
/// and redirects to the login route before the error is returned.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    media: MediaResolver,
    timeout: Duration,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Run the session guard and build a client. Without a stored token this
    /// redirects to login and returns `NoSession` without touching the network.
    pub fn connect(
        config: &AppConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let session = SessionGuard::require(store.as_ref(), navigator.as_ref())?;
        Self::with_session(config, &session, store, navigator)
    }

    pub fn with_session(
        config: &AppConfig,
        session: &Session,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let timeout = config.request_timeout();
        let http = reqwest::Client::builder()
            .default_headers(session.headers()?)
            .user_agent(config.api.user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ApiError::request_failed(FailureKind::Transport, None, format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            media: MediaResolver::new(&config.api.media_origin),
            timeout,
            store,
            navigator,
            cancel: CancellationToken::new(),
        })
    }

    /// Same client, tied to a different cancellation scope
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn media(&self) -> &MediaResolver {
        &self.media
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send(Method::GET, path, None).await?;
        decode(value)
    }

    /// Send one request and return the decoded JSON body (`Null` when empty)
    pub async fn send(&self, method: Method, path: &str, payload: Option<Payload>) -> Result<Value, ApiError> {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);

        match payload {
            Some(Payload::Json(body)) => request = request.json(&body),
            Some(Payload::Multipart(entries)) => request = request.multipart(Payload::into_form(entries)?),
            None => {}
        }

        tracing::debug!("{} {}", method, url);

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("{} {} cancelled before a response arrived", method, url);
                return Err(ApiError::Cancelled);
            }
            result = request.send() => result.map_err(|e| {
                let err = ApiError::from_transport(e, self.timeout);
                tracing::error!("{} {} failed: {}", method, url, err);
                err
            })?,
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Invalid or expired token on {} {}, redirecting to login", method, url);
            SessionGuard::expire(self.store.as_ref(), self.navigator.as_ref());
            return Err(ApiError::SessionExpired);
        }

        let body = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ApiError::Cancelled),
            text = response.text() => text.map_err(|e| ApiError::from_transport(e, self.timeout))?,
        };

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            tracing::warn!("{} {} returned {}: {}", method, url, status.as_u16(), err.user_message());
            return Err(err);
        }

        tracing::debug!("{} {} returned {}", method, url, status.as_u16());

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            ApiError::request_failed(
                FailureKind::Decode,
                Some(status.as_u16()),
                format!("Unexpected response from server: {}", e),
            )
        })
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::request_failed(FailureKind::Decode, None, format!("Unexpected response from server: {}", e))
    })
}

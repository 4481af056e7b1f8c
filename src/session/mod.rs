pub mod claims;
pub mod store;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::fmt;

pub use claims::TokenClaims;
pub use store::{FileTokenStore, MemoryTokenStore, SessionError, TokenStore, TOKEN_KEY};

use crate::error::ApiError;

/// Route every session failure sends the operator to
pub const LOGIN_ROUTE: &str = "/login";

/// Where the front end goes when the session ends
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

/// A live credential, read from the store at mount time
#[derive(Clone)]
pub struct Session {
    token: String,
}

// Never print the credential itself
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> Option<TokenClaims> {
        claims::inspect(&self.token)
    }

    /// Default headers for one client instance: bearer credential plus JSON content negotiation
    pub fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            tracing::warn!("Stored token contains characters not allowed in a header");
            ApiError::NoSession
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

pub struct SessionGuard;

impl SessionGuard {
    /// Read the stored credential. A missing or unreadable credential is `NoSession`.
    pub fn activate(store: &dyn TokenStore) -> Result<Session, ApiError> {
        match store.load() {
            Ok(Some(token)) => Ok(Session::new(token)),
            Ok(None) => {
                tracing::warn!("No auth token found, redirecting to login");
                Err(ApiError::NoSession)
            }
            Err(e) => {
                tracing::warn!("Unable to read stored session ({}), redirecting to login", e);
                Err(ApiError::NoSession)
            }
        }
    }

    /// Activate, redirecting to the login route when there is no credential
    pub fn require(store: &dyn TokenStore, navigator: &dyn Navigator) -> Result<Session, ApiError> {
        SessionGuard::activate(store).inspect_err(|_| navigator.redirect(LOGIN_ROUTE))
    }

    /// End the session: clear the stored token and go to the login route
    pub fn expire(store: &dyn TokenStore, navigator: &dyn Navigator) {
        if let Err(e) = store.clear() {
            tracing::error!("Failed to clear stored token: {}", e);
        }
        navigator.redirect(LOGIN_ROUTE);
    }
}

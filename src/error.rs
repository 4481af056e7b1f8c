// Client-side error taxonomy and normalizer for backend responses
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::ConfigError;

/// Longest raw (non-JSON) response body carried into a user-facing message
const MAX_RAW_BODY_CHARS: usize = 200;

/// Why a request failed when it is not a session or validation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Server,
    Transport,
    Timeout,
    Decode,
}

/// Every failure a resource call can resolve to
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No stored credential at mount time; nothing was sent
    #[error("Not logged in")]
    NoSession,

    /// The backend answered 401; the stored token has already been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("{message}")]
    ValidationFailed {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("{message}")]
    RequestFailed {
        kind: FailureKind,
        status: Option<u16>,
        message: String,
    },

    /// The owning controller was torn down while the request was in flight
    #[error("Request cancelled")]
    Cancelled,

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl ApiError {
    pub fn validation_failed(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        ApiError::ValidationFailed {
            message: message.into(),
            field_errors,
        }
    }

    pub fn request_failed(kind: FailureKind, status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        ApiError::request_failed(
            FailureKind::Timeout,
            None,
            format!("Request timed out after {}s", after.as_secs()),
        )
    }

    pub fn not_found(label: &str, id: impl std::fmt::Display) -> Self {
        ApiError::request_failed(FailureKind::Server, Some(404), format!("{} {} not found", label, id))
    }

    pub fn unsupported(resource: &'static str, operation: &'static str) -> Self {
        ApiError::Unsupported { resource, operation }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NoSession => "NO_SESSION",
            ApiError::SessionExpired => "SESSION_EXPIRED",
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::RequestFailed { kind: FailureKind::Timeout, .. } => "TIMEOUT",
            ApiError::RequestFailed { .. } => "REQUEST_FAILED",
            ApiError::Cancelled => "CANCELLED",
            ApiError::Unsupported { .. } => "UNSUPPORTED",
            ApiError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Field-level messages from the server, empty for anything but validation failures
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ApiError::ValidationFailed { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Whether this failure ends the session and should route to the login screen
    pub fn is_session_error(&self) -> bool {
        matches!(self, ApiError::NoSession | ApiError::SessionExpired)
    }

    /// Banner text: the message plus any field errors, one per clause
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationFailed { message, field_errors } if !field_errors.is_empty() => {
                let fields = field_errors
                    .iter()
                    .map(|(field, msg)| format!("{}: {}", field, msg))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{} ({})", message, fields)
            }
            other => other.to_string(),
        }
    }

    /// Normalize a non-2xx response into the taxonomy.
    ///
    /// Bodies follow the Django REST framework conventions: `{"detail": "..."}`
    /// for generic errors, `{"field": ["msg", ...]}` for validation errors and
    /// `non_field_errors` for form-wide messages.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::SessionExpired;
        }

        let code = Some(status.as_u16());

        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                let mut detail = None;
                let mut field_errors = BTreeMap::new();

                for (key, value) in &map {
                    let Some(text) = flatten_messages(value) else {
                        continue;
                    };
                    match key.as_str() {
                        "detail" | "non_field_errors" | "message" | "error" => {
                            detail.get_or_insert(text);
                        }
                        _ => {
                            field_errors.insert(key.clone(), text);
                        }
                    }
                }

                if status.is_client_error() && !field_errors.is_empty() {
                    return ApiError::validation_failed(
                        detail.unwrap_or_else(|| "Validation failed".to_string()),
                        field_errors,
                    );
                }

                let message = detail.unwrap_or_else(|| Value::Object(map).to_string());
                ApiError::request_failed(FailureKind::Server, code, message)
            }
            Ok(other) if !other.is_null() => {
                let message = flatten_messages(&other).unwrap_or_else(|| other.to_string());
                ApiError::request_failed(FailureKind::Server, code, message)
            }
            _ => {
                let trimmed = body.trim();
                let message = if trimmed.is_empty() {
                    format!(
                        "Request failed with status {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("")
                    )
                    .trim_end()
                    .to_string()
                } else {
                    truncate(trimmed, MAX_RAW_BODY_CHARS)
                };
                ApiError::request_failed(FailureKind::Server, code, message)
            }
        }
    }

    /// Normalize a transport-level failure (nothing usable came back)
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ApiError::timeout(timeout);
        }
        if err.is_decode() {
            return ApiError::request_failed(
                FailureKind::Decode,
                err.status().map(|s| s.as_u16()),
                format!("Unexpected response from server: {}", err),
            );
        }
        ApiError::request_failed(
            FailureKind::Transport,
            err.status().map(|s| s.as_u16()),
            format!("No response from server: {}", err),
        )
    }
}

/// Collapse a DRF message value (string or list of strings) to one line
fn flatten_messages(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_messages).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

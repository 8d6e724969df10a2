//! Client error types.

use jotter_core::session::SessionError;
use jotter_core::validation::ValidationError;
use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the session token. The session has been cleared.
    #[error("Session rejected (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status, with the server's message.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the session was cleared because of this error.
    pub fn is_session_rejected(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Convenience alias.
pub type ApiResult<T> = Result<T, ApiError>;

/// Human-readable message from an error body.
///
/// Prefers a JSON `message` field, then a JSON string, then the raw text.
pub(crate) fn extract_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(text) = value.as_str() {
            return text.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') {
        format!("Request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

/// The JSON `message` field only, if present.
pub(crate) fn json_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

use std::sync::Arc;

use http::{Method, StatusCode};
use serde_json::Value;

/// Everything a service call can fail with.
///
/// Cloneable so that one refresh outcome can be handed to every request
/// waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: Arc<reqwest::Error>,
    },

    #[error("{method} {path} returned {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        /// The server's `message` field, when the error payload carries one.
        message: Option<String>,
        /// The parsed error payload, `Value::Null` when absent or not JSON.
        payload: Value,
    },

    #[error("unexpected payload from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The token could not be written to or removed from session storage.
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True for failures where the backend never answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Pulls the human-readable `message` out of an error payload.
pub fn payload_message(payload: &Value) -> Option<String> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

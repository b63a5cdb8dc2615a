//! Typed entry points for the backend's REST resources.
//!
//! The backend wraps every payload as `{"data": ...}`; these helpers hand
//! back the inner `data` and leave its shape to the caller.

pub mod auth;
pub mod blogs;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::client::ApiError;

/// The `data` member of a response envelope, `Value::Null` when missing.
pub fn envelope_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

pub(crate) fn decode_data<T: DeserializeOwned>(path: &str, payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(envelope_data(payload)).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Logs a failed call under `what` and passes the result through.
pub(crate) fn logged<T>(what: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        error!("Error {}: {}", what, e);
    }
    result
}

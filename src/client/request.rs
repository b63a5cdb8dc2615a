use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method};
use serde_json::Value;

/// One-shot marker set on a request after its 401 triggered a refresh.
/// Never sent to the backend.
pub const NO_RETRY_HEADER: &str = "x-no-retry";

/// Describes an outgoing call: method, path relative to the API base URL
/// (query string included), optional JSON body and extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The path without its query string.
    pub fn route(&self) -> &str {
        self.path
            .split_once('?')
            .map_or(self.path.as_str(), |(route, _)| route)
    }

    pub fn is_retried(&self) -> bool {
        self.headers.contains_key(NO_RETRY_HEADER)
    }

    pub fn mark_retried(&mut self) {
        self.headers
            .insert(NO_RETRY_HEADER, HeaderValue::from_static("true"));
    }

    /// Pins the bearer token for the next attempt.
    pub fn set_bearer(&mut self, token: &str) -> Result<(), http::header::InvalidHeaderValue> {
        let value = bearer_header(token)?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Token from an explicit `Authorization: Bearer` header, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

pub(crate) fn bearer_header(token: &str) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    Ok(value)
}

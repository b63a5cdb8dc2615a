use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{payload_message, ApiError};
use super::refresh::RefreshGuard;
use super::request::{bearer_header, ApiRequest, NO_RETRY_HEADER};
use crate::config::ApiConfig;
use crate::session::SessionContext;

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh-token";
pub const CURRENT_USER_PATH: &str = "/auth/current-user";

/// Shown when the refresh endpoint rejects the session without saying why.
pub const DEFAULT_REFRESH_ERROR_MESSAGE: &str = "Có lỗi xảy ra, vui lòng login.";

/// Thin JSON client for the admin REST backend.
///
/// Attaches the stored bearer token to every call, unwraps successful
/// responses to their JSON body and recovers from an expired token with a
/// single refresh-and-retry. Cloning is cheap; clones share the cookie jar,
/// the session context and the refresh guard.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    refresh: RefreshGuard,
}

/// What came back from one attempt, plus the token it was sent with.
struct Attempt {
    status: StatusCode,
    payload: Value,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionContext>) -> Result<Self, ApiError> {
        // the refresh endpoint identifies the session through its cookie
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        info!("Creating API client for '{}'", config.base_url);
        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                session,
                refresh: RefreshGuard::new(),
            }),
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<Value, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: impl Into<String>, body: Option<Value>) -> Result<Value, ApiError> {
        self.send(with_optional_body(ApiRequest::post(path), body)).await
    }

    pub async fn put(&self, path: impl Into<String>, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::put(path).with_body(body)).await
    }

    pub async fn patch(&self, path: impl Into<String>, body: Option<Value>) -> Result<Value, ApiError> {
        self.send(with_optional_body(ApiRequest::patch(path), body)).await
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Sends `request` and returns the response body.
    ///
    /// A 401 on anything but the login or refresh endpoints triggers one
    /// refresh; if it yields a token the request is re-issued once with it.
    /// Every other failure comes back as [`ApiError::Status`] carrying the
    /// server's error payload.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        loop {
            let attempt = self.dispatch(&request).await?;
            if attempt.status.is_success() {
                return Ok(attempt.payload);
            }

            if should_refresh(&request, attempt.status) {
                request.mark_retried();
                debug!(
                    event_name = "client.request.unauthorized",
                    event_domain = "client",
                    method = %request.method,
                    path = request.route(),
                    "request rejected with 401; refreshing access token"
                );
                let token = self
                    .inner
                    .refresh
                    .refresh(self, attempt.token.as_deref())
                    .await?;
                if let Some(token) = token {
                    request
                        .set_bearer(&token)
                        .map_err(|e| ApiError::InvalidRequest(format!("refreshed token: {}", e)))?;
                    continue;
                }
            }

            return Err(self.reject(&request, attempt.status, attempt.payload));
        }
    }

    /// Calls the refresh endpoint once. Used from inside the refresh flight;
    /// never retried itself.
    pub(crate) async fn request_new_token(&self) -> Result<Option<String>, ApiError> {
        let request = ApiRequest::get(REFRESH_PATH);
        let attempt = self.dispatch(&request).await?;

        if !attempt.status.is_success() {
            let err = self.reject(&request, attempt.status, attempt.payload);
            warn!(
                event_name = "client.refresh.failed",
                event_domain = "client",
                status = attempt.status.as_u16(),
                "token refresh failed: {}",
                err
            );
            return Ok(None);
        }

        let token = attempt
            .payload
            .get("data")
            .and_then(|data| data.get("access_token"))
            .or_else(|| attempt.payload.get("access_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        match &token {
            Some(_) => info!(
                event_name = "client.refresh.succeeded",
                event_domain = "client",
                "access token refreshed"
            ),
            None => warn!(
                event_name = "client.refresh.empty",
                event_domain = "client",
                "refresh endpoint answered without an access token"
            ),
        }
        Ok(token)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Attempt, ApiError> {
        let url = format!("{}{}", self.inner.base_url, request.path);

        let mut headers = request.headers.clone();
        headers.remove(NO_RETRY_HEADER);

        let token = match self.session().access_token() {
            Some(stored) => {
                let value = bearer_header(&stored)
                    .map_err(|e| ApiError::InvalidRequest(format!("stored access token: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
                Some(stored)
            }
            None => request.bearer().map(str::to_string),
        };

        if request.body.is_some() && !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport = |source: reqwest::Error| ApiError::Transport {
            method: request.method.clone(),
            path: request.route().to_string(),
            source: Arc::new(source),
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        debug!(
            method = %request.method,
            path = request.route(),
            status = status.as_u16(),
            "API call completed"
        );

        Ok(Attempt {
            status,
            payload: parse_payload(&bytes),
            token,
        })
    }

    /// Builds the error for a failed attempt. A 400 from the refresh
    /// endpoint ends the session and tells the UI why.
    fn reject(&self, request: &ApiRequest, status: StatusCode, payload: Value) -> ApiError {
        let message = payload_message(&payload);

        if status == StatusCode::BAD_REQUEST && request.route() == REFRESH_PATH {
            let shown = message
                .clone()
                .unwrap_or_else(|| DEFAULT_REFRESH_ERROR_MESSAGE.to_string());
            self.session().set_refresh_error(true, shown);
        }

        ApiError::Status {
            method: request.method.clone(),
            path: request.route().to_string(),
            status,
            message,
            payload,
        }
    }
}

fn with_optional_body(request: ApiRequest, body: Option<Value>) -> ApiRequest {
    match body {
        Some(body) => request.with_body(body),
        None => request,
    }
}

fn should_refresh(request: &ApiRequest, status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
        && request.route() != LOGIN_PATH
        && request.route() != REFRESH_PATH
        && !request.is_retried()
}

/// Empty bodies become `null`; bodies that are not JSON are kept as a string.
fn parse_payload(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> ApiClient {
        let session = Arc::new(SessionContext::in_memory());
        ApiClient::new(&ApiConfig::new(server.url()), session).unwrap()
    }

    #[test]
    fn test_should_refresh_rules() {
        assert!(should_refresh(&ApiRequest::get("/orders"), StatusCode::UNAUTHORIZED));
        assert!(!should_refresh(&ApiRequest::get("/orders"), StatusCode::FORBIDDEN));
        assert!(!should_refresh(&ApiRequest::post(LOGIN_PATH), StatusCode::UNAUTHORIZED));
        assert!(!should_refresh(&ApiRequest::get(REFRESH_PATH), StatusCode::UNAUTHORIZED));

        let mut retried = ApiRequest::get("/orders");
        retried.mark_retried();
        assert!(!should_refresh(&retried, StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(b""), Value::Null);
        assert_eq!(parse_payload(b"  \n"), Value::Null);
        assert_eq!(parse_payload(br#"{"data": 1}"#), json!({"data": 1}));
        assert_eq!(parse_payload(b"OK"), json!("OK"));
    }

    #[tokio::test]
    async fn test_success_returns_body_with_bearer() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/products")
            .match_header("authorization", "Bearer stored-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"_id": "p1"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.session().store_access_token("stored-token").unwrap();

        let body = client.get("/products").await.unwrap();
        m.assert_async().await;
        assert_eq!(body, json!({"data": [{"_id": "p1"}]}));
    }

    #[tokio::test]
    async fn test_body_defaults_to_json_negotiation() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/products")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_header("authorization", Matcher::Missing)
            .match_header(NO_RETRY_HEADER, Matcher::Missing)
            .match_body(Matcher::Json(json!({"name": "Cà phê"})))
            .with_status(201)
            .with_body(r#"{"data": {"_id": "p2"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let body = client
            .post("/products", Some(json!({"name": "Cà phê"})))
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(body["data"]["_id"], "p2");
    }

    #[tokio::test]
    async fn test_explicit_accept_is_kept() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/orders/export")
            .match_header("accept", "text/csv")
            .with_status(200)
            .with_body("id,total\n")
            .create_async()
            .await;

        let client = client_for(&server);
        let request = ApiRequest::post("/orders/export")
            .with_body(json!({"from": "2024-01-01"}))
            .with_header(ACCEPT, HeaderValue::from_static("text/csv"));
        let body = client.send(request).await.unwrap();

        m.assert_async().await;
        assert_eq!(body, json!("id,total\n"));
    }

    #[tokio::test]
    async fn test_error_carries_server_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/products/p9")
            .with_status(404)
            .with_body(r#"{"message": "Product not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.delete("/products/p9").await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.message(), Some("Product not found"));
        assert!(!client.session().state().refresh_error.is_refresh_token);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let session = Arc::new(SessionContext::in_memory());
        // nothing listens on port 9 of localhost in the test environment
        let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9"), session).unwrap();

        let err = client.get("/orders").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_request_new_token_reads_envelope() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"data": {"access_token": "fresh"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.request_new_token().await.unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_request_new_token_without_token_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"data": {}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.request_new_token().await.unwrap(), None);
    }

    /// Holds a fixed token and refuses every write.
    struct ReadOnlyStorage(String);

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            Some(self.0.clone())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
            Err("read-only".to_string())
        }

        fn remove(&self, _key: &str) -> Result<(), String> {
            Err("read-only".to_string())
        }
    }

    #[tokio::test]
    async fn test_refreshed_token_that_cannot_be_stored_fails_the_request() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/orders")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .create_async()
            .await;
        let refresh = server
            .mock("GET", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"data": {"access_token": "fresh"}}"#)
            .expect(1)
            .create_async()
            .await;

        let session = SessionContext::new(
            Arc::new(ReadOnlyStorage("stale".to_string())),
            Arc::new(MemoryStorage::new()),
        );
        let client = ApiClient::new(&ApiConfig::new(server.url()), Arc::new(session)).unwrap();

        let err = client.get("/orders").await.unwrap_err();

        refresh.assert_async().await;
        assert!(matches!(err, ApiError::Storage(_)));
        assert!(!client.is_refreshing());
    }
}

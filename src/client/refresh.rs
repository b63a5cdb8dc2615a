use futures::future::FutureExt;
use tracing::debug;

use super::client::ApiClient;
use super::error::ApiError;
use super::single_flight::SingleFlight;

/// Outcome of one refresh wave: the new token, `None` when the backend did
/// not hand one out.
pub type RefreshOutcome = Result<Option<String>, ApiError>;

/// Makes sure at most one `GET /auth/refresh-token` is in flight.
///
/// Every request that hits a 401 while a refresh is running waits for that
/// refresh and retries with its token.
#[derive(Default)]
pub struct RefreshGuard {
    flight: SingleFlight<RefreshOutcome>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtains a fresh access token on behalf of a request that was rejected
    /// while carrying `stale_token`.
    ///
    /// When the stored token has already moved past `stale_token` (an earlier
    /// wave refreshed it), that token is returned without another refresh call.
    /// The new token is persisted once, inside the shared flight.
    pub async fn refresh(&self, client: &ApiClient, stale_token: Option<&str>) -> RefreshOutcome {
        if let Some(current) = client.session().access_token() {
            if stale_token != Some(current.as_str()) {
                debug!(
                    event_name = "client.refresh.already_rotated",
                    event_domain = "client",
                    "access token already rotated; reusing it"
                );
                return Ok(Some(current));
            }
        }

        let client = client.clone();
        self.flight
            .run(move || {
                async move {
                    let token = client.request_new_token().await?;
                    if let Some(token) = &token {
                        client
                            .session()
                            .store_access_token(token)
                            .map_err(ApiError::Storage)?;
                    }
                    Ok::<_, ApiError>(token)
                }
                .boxed()
            })
            .await
    }

    pub fn is_refreshing(&self) -> bool {
        self.flight.is_pending()
    }
}

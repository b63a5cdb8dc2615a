use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::context::SessionContext;
use crate::client::{ApiClient, ApiError};
use crate::models::{LoginData, SessionState};
use crate::services;

/// The login/load/logout actions views call to move the session between
/// Unauthenticated, Loading and Authenticated.
#[derive(Clone)]
pub struct AuthStore {
    client: ApiClient,
}

impl AuthStore {
    pub fn new(client: ApiClient) -> Self {
        AuthStore { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        self.client.session()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    /// Adopts a successful login: persists the token and marks the user signed in.
    ///
    /// The session stays as it was when the token cannot be stored.
    pub fn login(&self, data: LoginData) -> Result<(), ApiError> {
        let session = self.session();
        session.store_access_token(&data.access_token).map_err(|e| {
            error!(
                event_name = "session.login.storage_failed",
                event_domain = "session",
                "could not persist access token: {}",
                e
            );
            ApiError::Storage(e)
        })?;
        session.clear_refresh_error();
        info!(
            event_name = "session.login",
            event_domain = "session",
            user_id = data.user.id.as_deref().unwrap_or("unknown"),
            "user signed in"
        );
        session.set_authenticated(data.user);
        Ok(())
    }

    /// Asks the backend who the stored token belongs to.
    ///
    /// Any failure leaves the session unauthenticated; `is_loading` is
    /// false again once this returns or is dropped.
    pub async fn load_user(&self) {
        let session = self.session();
        session.set_loading(true);
        let _loading = LoadingGuard(session.as_ref());

        match services::auth::current_user(&self.client).await {
            Ok(user) => session.set_authenticated(user),
            Err(e) => {
                if e.is_transport() {
                    warn!(
                        event_name = "session.load_user.unreachable",
                        event_domain = "session",
                        "could not reach the backend to load the user: {}",
                        e
                    );
                } else {
                    debug!(
                        event_name = "session.load_user.rejected",
                        event_domain = "session",
                        "no signed-in user: {}",
                        e
                    );
                }
                session.set_unauthenticated();
            }
        }
    }

    /// Forgets the token and the user locally.
    pub fn logout(&self) {
        self.session().clear_access_token();
        self.session().set_unauthenticated();
        info!(
            event_name = "session.logout",
            event_domain = "session",
            "user signed out"
        );
    }

    /// Calls the login endpoint and adopts its result.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionState, ApiError> {
        let data = services::auth::login(&self.client, email, password).await?;
        self.login(data)?;
        Ok(self.state())
    }

    /// Best-effort server logout followed by the local [`logout`](Self::logout).
    pub async fn sign_out(&self) {
        if let Err(e) = services::auth::logout(&self.client).await {
            warn!("Server-side logout failed, clearing local session anyway: {}", e);
        }
        self.logout();
    }

    /// Admin screens only: a loaded user without the admin role, or a
    /// session that is no longer authenticated, loses the stored token.
    pub fn require_admin(&self) -> bool {
        let state = self.state();
        if state.user.is_some() && !state.is_admin() {
            warn!(
                event_name = "session.not_admin",
                event_domain = "session",
                "signed-in user is not an admin; dropping token"
            );
            self.session().clear_access_token();
            return false;
        }
        state.is_admin()
    }
}

struct LoadingGuard<'a>(&'a SessionContext);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

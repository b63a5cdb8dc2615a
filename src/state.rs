//! Shared application state.
//!
//! Everything a command needs: configuration, the session context, the API
//! client bound to it and the auth actions on top.

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::session::{AuthStore, SessionContext};
use std::sync::Arc;

/// Application state, built once at start-up and cloned where needed.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Authentication state and token storage.
    pub session: Arc<SessionContext>,
    /// HTTP client for the admin backend.
    pub client: ApiClient,
    /// Login, load-user and logout actions.
    pub auth: AuthStore,
}

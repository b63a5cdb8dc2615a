use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::models::{SessionState, UserSummary};
use crate::storage::{KeyValueStorage, MemoryStorage, ACCESS_TOKEN_KEY, LAST_PATH_KEY};

/// Process-wide authentication state, created once at start-up and handed to
/// everything that needs it.
///
/// `local` survives restarts and holds the access token; `session` only
/// lives as long as the process and remembers the last visited route.
/// State changes are published on a watch channel so views can re-render.
pub struct SessionContext {
    local: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(local: Arc<dyn KeyValueStorage>, session: Arc<dyn KeyValueStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        SessionContext {
            local,
            session,
            state,
        }
    }

    /// Both stores in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.local
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn store_access_token(&self, token: &str) -> Result<(), String> {
        self.local.set(ACCESS_TOKEN_KEY, token)
    }

    pub fn clear_access_token(&self) {
        if let Err(e) = self.local.remove(ACCESS_TOKEN_KEY) {
            error!("Failed to remove access token: {}", e);
        }
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|state| state.is_loading = is_loading);
    }

    pub fn set_authenticated(&self, user: UserSummary) {
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.is_authenticated = true;
        });
    }

    pub fn set_unauthenticated(&self) {
        self.state.send_modify(|state| {
            state.user = None;
            state.is_authenticated = false;
        });
    }

    /// Records the outcome of a rejected refresh. A failure drops the token
    /// and the user: nothing can be called until the next login.
    pub fn set_refresh_error(&self, is_refresh_token: bool, message: impl Into<String>) {
        let message = message.into();
        if is_refresh_token {
            info!(
                event_name = "session.refresh.rejected",
                event_domain = "session",
                "session ended by the backend: {}",
                message
            );
            self.clear_access_token();
        }
        self.state.send_modify(|state| {
            state.refresh_error.is_refresh_token = is_refresh_token;
            state.refresh_error.message = message;
            if is_refresh_token {
                state.user = None;
                state.is_authenticated = false;
            }
        });
    }

    pub fn clear_refresh_error(&self) {
        self.state
            .send_modify(|state| state.refresh_error = Default::default());
    }

    pub fn remember_path(&self, path: &str) {
        if let Err(e) = self.session.set(LAST_PATH_KEY, path) {
            error!("Failed to remember last path: {}", e);
        }
    }

    pub fn last_path(&self) -> Option<String> {
        self.session.get(LAST_PATH_KEY)
    }

    /// Where to go after landing on the login screen: the last visited path
    /// (or `/`) for an authenticated admin who still holds a token.
    pub fn resume_path(&self) -> Option<String> {
        if self.state.borrow().is_admin() && self.access_token().is_some() {
            Some(self.last_path().unwrap_or_else(|| "/".to_string()))
        } else {
            None
        }
    }
}

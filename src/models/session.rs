use serde::Serialize;

use super::user::UserSummary;

/// Snapshot of the client-side authentication state.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<UserSummary>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub refresh_error: RefreshErrorState,
}

impl SessionState {
    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.user.as_ref().is_some_and(UserSummary::is_admin)
    }
}

/// Set when the backend rejected a token refresh; the UI shows `message`
/// and sends the user back to the login screen.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshErrorState {
    pub is_refresh_token: bool,
    pub message: String,
}

impl RefreshErrorState {
    pub fn as_tuple(&self) -> (bool, &str) {
        (self.is_refresh_token, self.message.as_str())
    }
}

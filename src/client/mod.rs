pub mod client;
pub mod error;
pub mod refresh;
pub mod request;
pub mod single_flight;

// Re-export from client.rs so we can do "use crate::client::*;"
pub use client::{
    ApiClient, CURRENT_USER_PATH, DEFAULT_REFRESH_ERROR_MESSAGE, LOGIN_PATH, LOGOUT_PATH,
    REFRESH_PATH,
};
pub use error::ApiError;
pub use refresh::{RefreshGuard, RefreshOutcome};
pub use request::{ApiRequest, NO_RETRY_HEADER};
pub use single_flight::SingleFlight;

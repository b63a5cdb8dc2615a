pub mod order;
pub mod session;
pub mod user;

pub use order::OrderStatus;
pub use session::{RefreshErrorState, SessionState};
pub use user::{LoginData, UserSummary, ADMIN_ROLE};

pub mod currency;
pub mod logger;

pub use currency::format_vnd;
pub use logger::init_logging;

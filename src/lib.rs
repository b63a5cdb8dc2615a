//! Library exports for shopadmin, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;

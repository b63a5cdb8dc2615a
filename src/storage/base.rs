use std::sync::Arc;

use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

/// Persistent key holding the bearer token. Absence means unauthenticated.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Per-session key remembering the last visited admin route.
pub const LAST_PATH_KEY: &str = "lastPath";

/// The KeyValueStorage trait abstracts a small string store (get, set, remove).
///
/// Calls are synchronous and cheap; implementations must not block on the network.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn KeyValueStorage> {
    match config {
        StorageConfig::Memory => {
            info!("Using in-memory token storage.");
            Arc::new(MemoryStorage::new())
        }
        StorageConfig::File(file_config) => {
            info!("Using file token storage at '{}'.", file_config.path.display());
            Arc::new(FileStorage::new(&file_config.path))
        }
    }
}

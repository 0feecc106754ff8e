//! User store backends

pub mod memory;
pub mod sqlite;
pub mod traits;

use std::sync::Arc;

pub use memory::MemoryUserStorage;
pub use sqlite::SqliteUserStorage;
pub use traits::{StorageConfig, UserStorage};

use crate::error::Result;

/// Shared handle to whichever backend was configured
pub type SharedUserStorage = Arc<dyn UserStorage>;

/// Open the user store named by a database URL, running migrations if needed
pub fn open_user_storage(database_url: &str) -> Result<SharedUserStorage> {
    let storage: SharedUserStorage = match StorageConfig::parse(database_url)? {
        StorageConfig::Memory => {
            log::warn!("Using in-memory user store; users will not survive a restart");
            Arc::new(MemoryUserStorage::new())
        }
        StorageConfig::SqliteInMemory => {
            log::warn!("Using in-memory SQLite user store; users will not survive a restart");
            Arc::new(SqliteUserStorage::open_in_memory()?)
        }
        StorageConfig::SqliteFile(path) => Arc::new(SqliteUserStorage::open(&path)?),
    };

    log::info!("User store backend: {}", storage.backend_name());
    Ok(storage)
}

//! Abstract storage interfaces for pluggable backends
//!
//! The user store is an external collaborator of the auth core: anything
//! that can create users atomically and look them up by name qualifies.

use async_trait::async_trait;

use crate::auth::user::User;
use crate::error::{Result, TokenGateError};

/// User data storage interface
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Create a new user. Fails with `UserAlreadyExists` if the username is
    /// taken; on any failure nothing is stored.
    async fn create_user(&self, user: User) -> Result<()>;

    /// Get user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Get user by username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Number of registered users
    async fn count_users(&self) -> Result<u64>;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<bool> {
        self.count_users().await.map(|_| true)
    }

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Where users are kept, parsed from the configured database URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    SqliteInMemory,
    SqliteFile(String),
}

impl StorageConfig {
    pub fn parse(database_url: &str) -> Result<Self> {
        let url = database_url.trim();
        match url {
            "" => Err(TokenGateError::ConfigError(
                "database URL must not be empty".to_string(),
            )),
            "memory" | ":memory:" => Ok(Self::Memory),
            "sqlite::memory:" | "sqlite://:memory:" => Ok(Self::SqliteInMemory),
            _ => {
                if let Some(path) = url.strip_prefix("sqlite://") {
                    if path.is_empty() {
                        return Err(TokenGateError::ConfigError(
                            "sqlite:// URL is missing a path".to_string(),
                        ));
                    }
                    Ok(Self::SqliteFile(path.to_string()))
                } else if let Some((scheme, _)) = url.split_once("://") {
                    Err(TokenGateError::ConfigError(format!(
                        "Unsupported database scheme '{}'",
                        scheme
                    )))
                } else {
                    Ok(Self::SqliteFile(url.to_string()))
                }
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::SqliteFile(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_urls() {
        assert_eq!(StorageConfig::parse("memory").unwrap(), StorageConfig::Memory);
        assert_eq!(StorageConfig::parse(":memory:").unwrap(), StorageConfig::Memory);
        assert_eq!(
            StorageConfig::parse("sqlite::memory:").unwrap(),
            StorageConfig::SqliteInMemory
        );
        assert_eq!(
            StorageConfig::parse("sqlite://data/users.db").unwrap(),
            StorageConfig::SqliteFile("data/users.db".to_string())
        );
        assert_eq!(
            StorageConfig::parse("sqlite:///var/lib/app.db").unwrap(),
            StorageConfig::SqliteFile("/var/lib/app.db".to_string())
        );
        assert_eq!(
            StorageConfig::parse("users.db").unwrap(),
            StorageConfig::SqliteFile("users.db".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(StorageConfig::parse("").is_err());
        assert!(StorageConfig::parse("sqlite://").is_err());
        assert!(StorageConfig::parse("postgres://localhost/db").is_err());
    }

    #[test]
    fn test_persistence_flag() {
        assert!(!StorageConfig::Memory.is_persistent());
        assert!(!StorageConfig::SqliteInMemory.is_persistent());
        assert!(StorageConfig::SqliteFile("x.db".into()).is_persistent());
    }
}

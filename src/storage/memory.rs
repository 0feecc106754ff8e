//! In-memory storage implementation for development and testing
//!
//! Keeps all users in memory. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::UserStorage;
use crate::auth::user::User;
use crate::error::{Result, TokenGateError};

/// In-memory user storage
#[derive(Default)]
pub struct MemoryUserStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    username_index: Arc<RwLock<HashMap<String, String>>>, // username -> user_id
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn create_user(&self, user: User) -> Result<()> {
        // Check-and-insert under both write locks
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        if username_index.contains_key(&user.username) {
            return Err(TokenGateError::UserAlreadyExists(user.username));
        }

        username_index.insert(user.username.clone(), user.id.clone());
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        let username_index = self.username_index.read().await;

        Ok(username_index
            .get(username)
            .and_then(|id| users.get(id))
            .cloned())
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

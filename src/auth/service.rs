//! Registration and token issuance
//!
//! `AuthService` is the only place that touches both the user store and the
//! token manager. Handlers stay thin and delegate here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::clock::Clock;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{Claims, TokenManager};
use crate::auth::user::{validate_email, validate_password, validate_username, User};
use crate::config::ServerConfig;
use crate::constants::MAX_PASSWORD_LENGTH;
use crate::error::{Result, TokenGateError};
use crate::security::AuthTimer;
use crate::storage::SharedUserStorage;

/// Token endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds from issuance to expiry
    pub expires_in: i64,
}

impl IssuedToken {
    fn from_claims(token: String, claims: &Claims) -> Result<Self> {
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or_else(|| {
            TokenGateError::SystemError(format!("Expiry {} out of range", claims.exp))
        })?;

        Ok(Self {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
            expires_in: claims.exp - claims.iat,
        })
    }
}

pub struct AuthService {
    users: SharedUserStorage,
    tokens: Arc<TokenManager>,
    auth_min_duration: Duration,
    /// Verified against when the username is unknown, so that path costs the
    /// same as a wrong password
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: SharedUserStorage,
        tokens: Arc<TokenManager>,
        auth_min_duration: Duration,
    ) -> Result<Self> {
        let dummy_hash = hash_password(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            users,
            tokens,
            auth_min_duration,
            dummy_hash,
        })
    }

    /// Wire a service from the startup configuration
    pub fn from_config(
        config: &ServerConfig,
        users: SharedUserStorage,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenManager::new(
            &config.jwt_secret,
            config.token_validity,
            clock,
        ));
        Self::new(users, tokens, config.auth_min_duration)
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn users(&self) -> &SharedUserStorage {
        &self.users
    }

    /// Create an account. The password is hashed before it reaches the store.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User> {
        let username = validate_username(username)?;
        validate_password(password)?;
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Some(validate_email(email)?),
            None => None,
        };

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = User::new(username, password_hash, email);
        match self.users.create_user(user.clone()).await {
            Ok(()) => {
                log::info!("Registered user {} ({})", user.username, user.id);
                Ok(user)
            }
            Err(e) => {
                log::warn!("Registration of '{}' failed: {}", user.username, e);
                Err(e)
            }
        }
    }

    /// Exchange credentials for a signed token
    pub async fn issue(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let username = username.trim();
        if username.is_empty() {
            return Err(TokenGateError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(TokenGateError::ValidationError(
                "password must not be empty".to_string(),
            ));
        }

        let timer = AuthTimer::new(self.auth_min_duration);
        let user = match self.check_credentials(username, password).await {
            Ok(user) => user,
            Err(e) => {
                if e.is_auth_failure() {
                    log::warn!(target: "token_gate::security", "Token request for '{}' rejected: {}", username, e);
                }
                timer.wait().await;
                return Err(e);
            }
        };

        let (token, claims) = self.tokens.issue(&user.id, &user.username)?;
        log::debug!("Issued token for {} expiring at {}", user.id, claims.exp);
        IssuedToken::from_claims(token, &claims)
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<User> {
        // No stored account can have a longer password
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(TokenGateError::InvalidCredentials);
        }

        let user = self.users.get_user_by_username(username).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password = password.to_string();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?;

        match user {
            Some(user) if matches => Ok(user),
            _ => Err(TokenGateError::InvalidCredentials),
        }
    }
}

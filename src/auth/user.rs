use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use crate::error::{Result, TokenGateError};

/// A registered account as held by the user store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier, the token subject
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string, never the plaintext
    pub password_hash: String,
    /// Email address (optional)
    pub email: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with a fresh identifier
    pub fn new(username: String, password_hash: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            email,
            created_at: Utc::now(),
        }
    }

    /// Public representation, without the credential
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// What clients get to see of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Normalize and validate a username
pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(TokenGateError::ValidationError(
            "username must not be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(TokenGateError::ValidationError(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(TokenGateError::ValidationError(
            "username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// Passwords are taken as-is: no trimming and no complexity rules
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(TokenGateError::ValidationError(
            "password must not be empty".to_string(),
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(TokenGateError::ValidationError(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    let valid = email.len() <= MAX_EMAIL_LENGTH
        && !email.chars().any(|c| c.is_whitespace() || c.is_control())
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@'));

    if valid {
        Ok(email.to_string())
    } else {
        Err(TokenGateError::ValidationError(
            "email address is malformed".to_string(),
        ))
    }
}

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::clock::Clock;
use crate::constants::MAX_TOKEN_LENGTH;
use crate::error::{Result, TokenGateError};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user, valid for `validity` from `now`
    pub fn new(user_id: String, username: String, now: i64, validity: Duration) -> Self {
        Self {
            sub: user_id,
            username,
            iat: now,
            exp: now.saturating_add(validity.as_secs() as i64),
        }
    }

    /// A token is expired from its `exp` instant onwards
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Manages JWT token operations
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    /// Creates a new token manager with a secret
    pub fn new(secret: &str, validity: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock so the boundary is exact
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
            clock,
        }
    }

    /// Builds and signs claims for a user starting now
    pub fn issue(&self, user_id: &str, username: &str) -> Result<(String, Claims)> {
        let claims = Claims::new(
            user_id.to_string(),
            username.to_string(),
            self.clock.unix_timestamp(),
            self.validity,
        );
        let token = self.generate_token(&claims)?;
        Ok((token, claims))
    }

    /// Generates a JWT token for the given claims
    pub fn generate_token(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenGateError::SystemError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature, then the expiry, and returns the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenGateError::InvalidToken("token too long".to_string()));
        }
        if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(TokenGateError::InvalidToken(
                "token contains invalid characters".to_string(),
            ));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenGateError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(TokenGateError::InvalidToken("empty subject".to_string()));
        }

        if claims.is_expired_at(self.clock.unix_timestamp()) {
            return Err(TokenGateError::ExpiredToken);
        }

        Ok(claims)
    }
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;

    const SECRET: &str = "unit-test-signing-key-0123456789abcdef";

    fn manager(clock: Arc<ManualClock>) -> TokenManager {
        TokenManager::new(SECRET, Duration::from_secs(60), clock)
    }

    #[test]
    fn test_issue_sets_window() {
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = manager(clock.clone());
        let (_, claims) = tokens.issue("user-1", "alice").unwrap();
        assert_eq!(claims.iat, clock.unix_timestamp());
        assert_eq!(claims.exp, claims.iat + 60);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = manager(clock.clone());
        let (token, _) = tokens.issue("user-1", "alice").unwrap();

        clock.advance(59);
        assert!(tokens.verify(&token).is_ok());

        clock.advance(1);
        assert!(matches!(tokens.verify(&token), Err(TokenGateError::ExpiredToken)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let clock = Arc::new(ManualClock::starting_now());
        let (token, _) = manager(clock.clone()).issue("user-1", "alice").unwrap();
        let other = TokenManager::new(
            "another-signing-key-9876543210fedcba",
            Duration::from_secs(60),
            clock,
        );
        assert!(matches!(other.verify(&token), Err(TokenGateError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_other_algorithms() {
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = manager(clock.clone());
        let claims = Claims::new("user-1".into(), "alice".into(), clock.unix_timestamp(), Duration::from_secs(60));
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(tokens.verify(&hs512), Err(TokenGateError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_oversized_and_control_chars() {
        let tokens = manager(Arc::new(ManualClock::starting_now()));
        let long = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert!(matches!(tokens.verify(&long), Err(TokenGateError::InvalidToken(_))));
        assert!(matches!(tokens.verify("abc\u{0}def"), Err(TokenGateError::InvalidToken(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer    "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}

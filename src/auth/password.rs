//! Argon2id password hashing
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! the hash. Verification goes through `argon2`'s constant-time comparison.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::{Result, TokenGateError};

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TokenGateError::SystemError(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC hash.
///
/// A malformed stored hash counts as a mismatch rather than an error so a
/// corrupted record can never authenticate.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123!", &hash));
        assert!(!verify_password("secret123!", &hash));
    }

    #[test]
    fn test_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_never_plaintext() {
        let hash = hash_password("Secret123!").unwrap();
        assert!(!hash.contains("Secret123!"));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}

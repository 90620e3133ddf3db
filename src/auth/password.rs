//! Password hashing
//!
//! bcrypt with the library default cost. Verification failures on malformed
//! hashes surface as errors, not as a mismatch.

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

/// Password hashing errors
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashFailed(String),

    #[error("Failed to verify password: {0}")]
    VerifyFailed(String),
}

/// Hash a plaintext password
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// Verify a plaintext password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    verify(password, password_hash).map_err(|e| PasswordError::VerifyFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22hunter22").unwrap();
        assert!(verify_password("hunter22hunter22", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}

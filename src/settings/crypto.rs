//! Encryption for payment-provider credentials at rest
//!
//! AES-256-GCM with a random 12-byte nonce prefixed to the ciphertext, the
//! whole blob base64-encoded for storage in a text column.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Credential encryption errors
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Encryption failed")]
    EncryptFailed,

    #[error("Decryption failed")]
    DecryptFailed,

    #[error("Invalid encrypted payload")]
    InvalidPayload,
}

/// Symmetric cipher for provider secrets
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// Derive the AES key from the configured secret string
    pub fn new(secret: &str) -> Self {
        let key_bytes = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt a plaintext secret for storage
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::EncryptFailed)?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(blob))
    }

    /// Decrypt a stored secret
    pub fn decrypt(&self, encrypted: &str) -> Result<String, CipherError> {
        let blob = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|_| CipherError::InvalidPayload)?;

        if blob.len() < 12 {
            return Err(CipherError::InvalidPayload);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::DecryptFailed)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let cipher = CredentialCipher::new("test-key");
        let encrypted = cipher.encrypt("paypal-client-secret").unwrap();
        assert_ne!(encrypted, "paypal-client-secret");
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "paypal-client-secret");
    }

    #[test]
    fn test_unique_ciphertexts() {
        let cipher = CredentialCipher::new("test-key");
        // Random nonces mean identical plaintexts encrypt differently
        assert_ne!(
            cipher.encrypt("secret").unwrap(),
            cipher.encrypt("secret").unwrap()
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = CredentialCipher::new("key-one");
        let other = CredentialCipher::new("key-two");
        let encrypted = cipher.encrypt("secret").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_garbage_payload_fails() {
        let cipher = CredentialCipher::new("key");
        assert!(cipher.decrypt("not-base64!!!").is_err());
        assert!(cipher.decrypt("AAAA").is_err());
    }
}

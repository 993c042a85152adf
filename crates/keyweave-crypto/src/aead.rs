//! ChaCha20-Poly1305 content cryptor.
//!
//! Ciphertext layout is `[12-byte nonce][ciphertext || tag]`. Unlike CBC, a
//! wrong key or any tampering is always detected.

use async_trait::async_trait;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

use keyweave_core::{Algorithm, KeyMaterial};

use crate::cryptor::{require_data, require_key, Cryptor};
use crate::error::{CryptoError, Result};
use crate::payload::Payload;

/// Length of the ChaCha20-Poly1305 nonce.
pub const NONCE_LENGTH: usize = 12;

/// A 96-bit nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeadNonce(pub [u8; NONCE_LENGTH]);

impl AeadNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

/// Authenticated content cryptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AeadCryptor;

impl AeadCryptor {
    /// Create an AEAD cryptor.
    pub fn new() -> Self {
        Self
    }

    fn cipher(key: &KeyMaterial) -> Result<ChaCha20Poly1305> {
        ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }
}

#[async_trait]
impl Cryptor for AeadCryptor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Aead
    }

    async fn encrypt(&self, payload: &Payload, key: Option<&KeyMaterial>) -> Result<Vec<u8>> {
        let key = require_key(self.algorithm(), key)?;
        let data = require_data(self.algorithm(), payload)?;

        let nonce = AeadNonce::generate();
        let ciphertext = Self::cipher(key)?
            .encrypt(Nonce::from_slice(nonce.as_bytes()), data)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        out.extend_from_slice(nonce.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    async fn decrypt(&self, ciphertext: &[u8], key: Option<&KeyMaterial>) -> Result<Payload> {
        let key = require_key(self.algorithm(), key)?;
        if ciphertext.len() < NONCE_LENGTH {
            return Err(CryptoError::DecryptionFailed(format!(
                "ciphertext of {} bytes is shorter than the nonce",
                ciphertext.len()
            )));
        }
        let (nonce, body) = ciphertext.split_at(NONCE_LENGTH);
        Self::cipher(key)?
            .decrypt(Nonce::from_slice(nonce), body)
            .map(Payload::Data)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let cryptor = AeadCryptor::new();
        let key = cryptor.generate_key();
        let payload = Payload::Data(b"hello, encrypted world!".to_vec());

        let ciphertext = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_eq!(ciphertext.len(), NONCE_LENGTH + 23 + 16);
        assert_eq!(cryptor.decrypt(&ciphertext, Some(&key)).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_wrong_key_fails() {
        let cryptor = AeadCryptor::new();
        let ciphertext = cryptor
            .encrypt(&Payload::Data(b"secret".to_vec()), Some(&KeyMaterial::generate()))
            .await
            .unwrap();

        let result = cryptor.decrypt(&ciphertext, Some(&KeyMaterial::generate())).await;
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[tokio::test]
    async fn test_tampering_detected() {
        let cryptor = AeadCryptor::new();
        let key = cryptor.generate_key();
        let mut ciphertext = cryptor
            .encrypt(&Payload::Data(b"secret".to_vec()), Some(&key))
            .await
            .unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;

        let result = cryptor.decrypt(&ciphertext, Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[tokio::test]
    async fn test_fresh_nonce_per_call() {
        let cryptor = AeadCryptor::new();
        let key = cryptor.generate_key();
        let payload = Payload::Data(b"x".to_vec());
        let a = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        let b = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_ne!(a[..NONCE_LENGTH], b[..NONCE_LENGTH]);
    }
}

//! The cryptor contract.

use async_trait::async_trait;

use keyweave_core::{Algorithm, CryptoInfo, KeyMaterial, KEY_LENGTH_BITS};

use crate::error::{CryptoError, Result};
use crate::payload::Payload;

/// A symmetric cipher selectable by [`Algorithm`].
///
/// Keyed cryptors fail with [`CryptoError::MissingKey`] when `key` is `None`.
/// The key parameter stays optional so every variant shares one signature.
#[async_trait]
pub trait Cryptor: Send + Sync {
    /// Algorithm this cryptor implements.
    fn algorithm(&self) -> Algorithm;

    /// Generate a fresh random key of the cryptor's length.
    fn generate_key(&self) -> KeyMaterial {
        KeyMaterial::generate()
    }

    /// Crypto info tagging ciphertext produced by this cryptor.
    fn crypto_info(&self, originator: &str) -> CryptoInfo {
        CryptoInfo::new(self.algorithm(), originator).with_key_length(KEY_LENGTH_BITS)
    }

    /// Encrypt a payload.
    async fn encrypt(&self, payload: &Payload, key: Option<&KeyMaterial>) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext produced by [`Cryptor::encrypt`].
    async fn decrypt(&self, ciphertext: &[u8], key: Option<&KeyMaterial>) -> Result<Payload>;
}

/// Unwrap an optional key or fail with `MissingKey`.
pub(crate) fn require_key(
    algorithm: Algorithm,
    key: Option<&KeyMaterial>,
) -> Result<&KeyMaterial> {
    key.ok_or(CryptoError::MissingKey(algorithm))
}

/// Borrow the bytes of a data payload or fail with `UnsupportedPayload`.
pub(crate) fn require_data(algorithm: Algorithm, payload: &Payload) -> Result<&[u8]> {
    payload.as_data().ok_or(CryptoError::UnsupportedPayload {
        algorithm,
        kind: payload.kind(),
    })
}

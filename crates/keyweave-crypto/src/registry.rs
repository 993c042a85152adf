//! Lookup table from [`Algorithm`] to [`Cryptor`].

use std::collections::HashMap;
use std::sync::Arc;

use keyweave_core::{Algorithm, CryptoInfo};
use keyweave_store::BlobStore;

use crate::aead::AeadCryptor;
use crate::blob::{BlobCryptor, DEFAULT_FAN_OUT};
use crate::content::ContentCryptor;
use crate::cryptor::Cryptor;
use crate::error::{CryptoError, Result};
use crate::hash::HashCryptor;
use crate::unencrypted::UnencryptedCryptor;

/// Registered cryptors, keyed by algorithm.
#[derive(Clone, Default)]
pub struct CryptorRegistry {
    cryptors: HashMap<Algorithm, Arc<dyn Cryptor>>,
}

impl CryptorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in cryptor. The blob cryptor uses `blobs`.
    pub fn with_defaults(blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_blob_fan_out(blobs, DEFAULT_FAN_OUT)
    }

    /// Like [`with_defaults`](Self::with_defaults), with the blob cryptor
    /// limited to `fan_out` concurrent blob-store requests.
    pub fn with_blob_fan_out(blobs: Arc<dyn BlobStore>, fan_out: usize) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ContentCryptor::new()));
        registry.register(Arc::new(BlobCryptor::new(blobs).with_fan_out(fan_out)));
        registry.register(Arc::new(HashCryptor::new()));
        registry.register(Arc::new(UnencryptedCryptor::new()));
        registry.register(Arc::new(AeadCryptor::new()));
        registry
    }

    /// Register a cryptor under its own algorithm, replacing any previous one.
    pub fn register(&mut self, cryptor: Arc<dyn Cryptor>) -> &mut Self {
        self.cryptors.insert(cryptor.algorithm(), cryptor);
        self
    }

    /// Look up the cryptor for an algorithm.
    pub fn resolve(&self, algorithm: Algorithm) -> Result<Arc<dyn Cryptor>> {
        self.cryptors
            .get(&algorithm)
            .cloned()
            .ok_or(CryptoError::UnsupportedAlgorithm(algorithm))
    }

    /// Look up the cryptor that decodes ciphertext tagged with `info`.
    pub fn resolve_by_crypto_info(&self, info: &CryptoInfo) -> Result<Arc<dyn Cryptor>> {
        self.resolve(info.algorithm)
    }

    /// Whether a cryptor is registered for the algorithm.
    pub fn contains(&self, algorithm: Algorithm) -> bool {
        self.cryptors.contains_key(&algorithm)
    }
}

impl std::fmt::Debug for CryptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut algorithms: Vec<_> = self.cryptors.keys().map(Algorithm::as_str).collect();
        algorithms.sort_unstable();
        f.debug_struct("CryptorRegistry")
            .field("algorithms", &algorithms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyweave_store::MemoryBlobStore;

    #[test]
    fn test_defaults_cover_every_algorithm() {
        let registry = CryptorRegistry::with_defaults(Arc::new(MemoryBlobStore::new()));
        for algorithm in Algorithm::ALL {
            assert_eq!(registry.resolve(algorithm).unwrap().algorithm(), algorithm);
        }
    }

    #[test]
    fn test_unregistered_algorithm() {
        let mut registry = CryptorRegistry::new();
        registry.register(Arc::new(ContentCryptor::new()));

        assert!(registry.contains(Algorithm::Content));
        let result = registry.resolve(Algorithm::Blob);
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm(Algorithm::Blob))));
    }

    #[test]
    fn test_resolve_by_crypto_info() {
        let registry = CryptorRegistry::with_defaults(Arc::new(MemoryBlobStore::new()));
        let info = CryptoInfo::new(Algorithm::HashCipher, "0x01");
        let cryptor = registry.resolve_by_crypto_info(&info).unwrap();
        assert_eq!(cryptor.algorithm(), Algorithm::HashCipher);
    }
}

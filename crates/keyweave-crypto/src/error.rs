//! Error types for cryptors.

use keyweave_core::{Algorithm, CoreError};
use keyweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur while encrypting or decrypting.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A keyed cryptor was called without a key.
    #[error("missing key for {0}")]
    MissingKey(Algorithm),

    /// No cryptor is registered for the algorithm.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(Algorithm),

    /// Ciphertext could not be authenticated or parsed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The cryptor does not handle this kind of payload.
    #[error("{algorithm} cannot handle a {kind} payload")]
    UnsupportedPayload {
        /// Cryptor algorithm.
        algorithm: Algorithm,
        /// Payload kind that was offered.
        kind: &'static str,
    },

    /// Input shape is invalid for the cryptor.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Blob store or key provider failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for cryptor operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

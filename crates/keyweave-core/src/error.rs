//! Error types for keyweave core primitives.

use thiserror::Error;

/// Errors raised while parsing or converting core primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length for {kind}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid block key: {0:?}")]
    InvalidBlockKey(String),

    #[error("unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

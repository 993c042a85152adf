//! Error types for collaborator operations.

use thiserror::Error;

use keyweave_core::{Address, Bytes32};

/// Errors surfaced by the transaction executor, blob store, or key provider.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Blob not present in the store.
    #[error("blob not found: {0}")]
    BlobNotFound(Bytes32),

    /// Blob upload failed.
    #[error("blob upload failed for {name}: {reason}")]
    Upload { name: String, reason: String },

    /// Read-only contract call failed.
    #[error("call {method} on {contract} failed: {reason}")]
    Call {
        contract: Address,
        method: String,
        reason: String,
    },

    /// State-changing transaction failed.
    #[error("transaction {method} on {contract} failed: {reason}")]
    Transaction {
        contract: Address,
        method: String,
        reason: String,
    },

    /// Method not known to the executor.
    #[error("unknown method {method} on {contract}")]
    UnknownMethod { contract: Address, method: String },

    /// Argument or return value had an unexpected shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// External keystore failure.
    #[error("key provider error: {0}")]
    KeyProvider(String),
}

/// Result type for collaborator operations.
pub type Result<T> = std::result::Result<T, StoreError>;

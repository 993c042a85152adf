//! Error types for envelope encryption.

use keyweave_core::{AccountId, BlockKey, CoreError, SlotKey};
use keyweave_crypto::CryptoError;
use keyweave_sharing::SharingError;
use keyweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur while encrypting or decrypting envelopes.
#[derive(Debug, Error)]
pub enum KeyweaveError {
    /// No content key is shared with the account.
    #[error("no content key for {account} in {contract}, section {section:?} at block {block}")]
    NoContentKey {
        /// Contract and slot.
        contract: SlotKey,
        /// Account the key was looked up for.
        account: AccountId,
        /// Section name.
        section: String,
        /// Block the key had to be valid at.
        block: BlockKey,
    },

    /// No hash key is shared with the account.
    #[error("no hash key for {account} in {contract}")]
    NoHashKey {
        /// Contract and slot.
        contract: SlotKey,
        /// Account the key was looked up for.
        account: AccountId,
    },

    /// Envelope shape is invalid.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Plaintext could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Sharing key store error.
    #[error("sharing error: {0}")]
    Sharing(#[from] SharingError),

    /// Cryptor error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Collaborator error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, KeyweaveError>;

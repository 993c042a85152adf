//! Error types for the sharing key store.

use keyweave_core::{AccountId, CoreError, PartnerHash, SlotKey};
use keyweave_crypto::CryptoError;
use keyweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading or mutating sharing graphs.
///
/// Absence of a key is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum SharingError {
    /// The two accounts have no shared edge key.
    #[error("no edge key between {originator} and {partner}{}", in_slot_suffix(.slot))]
    NoEdgeKey {
        /// Account extending the sharing.
        originator: AccountId,
        /// Account receiving it.
        partner: AccountId,
        /// Contract and slot being written, when known.
        slot: Option<SlotKey>,
    },

    /// A fetched sharing blob could not be parsed.
    #[error("malformed sharing graph for {slot}: {reason}")]
    MalformedGraph {
        /// Contract and slot the graph belongs to.
        slot: SlotKey,
        /// Parser message.
        reason: String,
    },

    /// A hash-key entry exists but the caller cannot unwrap it.
    #[error("hash key of {partner} in {slot} exists but cannot be unwrapped")]
    HashKeyUnreadable {
        /// Contract and slot.
        slot: SlotKey,
        /// Partner holding the entry.
        partner: PartnerHash,
    },

    /// A graph could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Cryptor failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Ledger, blob store, or key provider failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl SharingError {
    /// Attach the contract and slot to an error raised below slot level.
    pub(crate) fn in_slot(self, at: &SlotKey) -> Self {
        match self {
            SharingError::NoEdgeKey {
                originator,
                partner,
                slot: None,
            } => SharingError::NoEdgeKey {
                originator,
                partner,
                slot: Some(at.clone()),
            },
            other => other,
        }
    }
}

fn in_slot_suffix(slot: &Option<SlotKey>) -> String {
    slot.as_ref().map(|s| format!(" in {s}")).unwrap_or_default()
}

/// Result type for sharing operations.
pub type Result<T> = std::result::Result<T, SharingError>;

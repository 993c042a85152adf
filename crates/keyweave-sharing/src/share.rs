//! Requests and reports for sharing mutations.

use keyweave_core::{AccountId, BlockKey, KeyMaterial, CATCH_ALL_SECTION};

/// One key to place in a sharing graph.
///
/// Without a `context`, the key is wrapped under the edge between
/// `originator` and `partner`. With one, it is wrapped under the context's
/// edge instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShare {
    /// Account granting access.
    pub originator: AccountId,
    /// Account receiving access.
    pub partner: AccountId,
    /// Section name, or `"*"` for every section.
    pub section: String,
    /// Block the key is valid from, or the hash-key slot.
    pub block: BlockKey,
    /// Key being shared.
    pub key: KeyMaterial,
    /// Explicit edge context.
    pub context: Option<String>,
}

impl KeyShare {
    /// Share `key` for `section` from `block` onwards.
    pub fn new(
        originator: AccountId,
        partner: AccountId,
        section: impl Into<String>,
        block: impl Into<BlockKey>,
        key: KeyMaterial,
    ) -> Self {
        Self {
            originator,
            partner,
            section: section.into(),
            block: block.into(),
            key,
            context: None,
        }
    }

    /// Share a hash key. It lives in the catch-all section's hash-key slot.
    pub fn hash_key(originator: AccountId, partner: AccountId, key: KeyMaterial) -> Self {
        Self::new(originator, partner, CATCH_ALL_SECTION, BlockKey::HashKey, key)
    }

    /// Wrap under an explicit context edge.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The same share addressed to another partner.
    pub fn for_partner(&self, partner: AccountId) -> Self {
        Self {
            partner,
            ..self.clone()
        }
    }
}

/// What `add_sharing` did about the partner's hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKeyPropagation {
    /// The share itself was a hash key.
    NotRequested,
    /// The partner already had a hash key.
    AlreadyPresent,
    /// The originator's hash key was shared with the partner.
    Propagated,
    /// The originator has no hash key, so none was shared.
    OriginatorHasNone,
}

/// Outcome of `add_sharing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharingReport {
    /// Hash-key handling.
    pub hash_key: HashKeyPropagation,
}

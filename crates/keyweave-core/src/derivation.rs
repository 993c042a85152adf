//! Deterministic derivation of sharing-graph lookup keys.
//!
//! Partner, section, and edge hashes are one-way. The same hash function must
//! be used everywhere a hash is compared, including any contract that checks
//! permissions against hashed values, so the function is pluggable through
//! [`IdentifierHasher`]. No domain prefix is mixed in: `partner_hash(a)` is
//! exactly `H(a)` so that a contract computing `H(a)` agrees bit for bit.

use std::sync::Arc;

use crate::types::{AccountId, Bytes32, EdgeHash, PartnerHash, SectionHash};

/// Section name that matches every section.
pub const CATCH_ALL_SECTION: &str = "*";

/// One-way hash from bytes to a `bytes32`.
pub trait IdentifierHasher: Send + Sync {
    /// Hash the input.
    fn hash(&self, data: &[u8]) -> Bytes32;
}

/// Blake3 identifier hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl IdentifierHasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Bytes32 {
        Bytes32(*blake3::hash(data).as_bytes())
    }
}

/// Derives every lookup hash used by the sharing graph.
#[derive(Clone)]
pub struct KeyDerivation {
    hasher: Arc<dyn IdentifierHasher>,
}

impl KeyDerivation {
    /// Use a custom identifier hasher.
    pub fn new(hasher: Arc<dyn IdentifierHasher>) -> Self {
        Self { hasher }
    }

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> Bytes32 {
        self.hasher.hash(data)
    }

    /// First-level key of the sharing graph.
    pub fn partner_hash(&self, account: &AccountId) -> PartnerHash {
        PartnerHash(self.hash(account.as_str().as_bytes()))
    }

    /// Second-level key of the sharing graph.
    pub fn section_hash(&self, section: &str) -> SectionHash {
        SectionHash(self.hash(section.as_bytes()))
    }

    /// Hash of the `"*"` section, used as fallback.
    pub fn catch_all_section(&self) -> SectionHash {
        self.section_hash(CATCH_ALL_SECTION)
    }

    /// Edge between two accounts.
    ///
    /// The two account hashes are sorted before hashing, so
    /// `edge_hash(a, b) == edge_hash(b, a)`.
    pub fn edge_hash(&self, a: &AccountId, b: &AccountId) -> EdgeHash {
        let ha = self.hash(a.as_str().as_bytes());
        let hb = self.hash(b.as_str().as_bytes());
        let (lo, hi) = if ha <= hb { (ha, hb) } else { (hb, ha) };

        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(lo.as_bytes());
        buf[32..].copy_from_slice(hi.as_bytes());
        EdgeHash(self.hash(&buf))
    }

    /// Edge named by an explicit context string.
    pub fn context_hash(&self, context: &str) -> EdgeHash {
        EdgeHash(self.hash(context.as_bytes()))
    }
}

impl Default for KeyDerivation {
    fn default() -> Self {
        Self::new(Arc::new(Blake3Hasher))
    }
}

impl std::fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyDerivation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_hash_is_symmetric() {
        let derivation = KeyDerivation::default();
        let alice = AccountId::from("0xA11CE");
        let bob = AccountId::from("0xB0B");
        assert_eq!(
            derivation.edge_hash(&alice, &bob),
            derivation.edge_hash(&bob, &alice)
        );
    }

    #[test]
    fn test_edge_hash_differs_per_pair() {
        let derivation = KeyDerivation::default();
        let a = AccountId::from("a");
        let b = AccountId::from("b");
        let c = AccountId::from("c");
        assert_ne!(derivation.edge_hash(&a, &b), derivation.edge_hash(&a, &c));
    }

    #[test]
    fn test_partner_hash_is_plain_hash() {
        let derivation = KeyDerivation::default();
        let account = AccountId::from("0xA11CE");
        assert_eq!(
            derivation.partner_hash(&account).0,
            Bytes32(*blake3::hash(b"0xA11CE").as_bytes())
        );
    }

    #[test]
    fn test_catch_all_section() {
        let derivation = KeyDerivation::default();
        assert_eq!(derivation.catch_all_section(), derivation.section_hash("*"));
        assert_ne!(derivation.catch_all_section(), derivation.section_hash("balance"));
    }

    #[test]
    fn test_custom_hasher() {
        struct Constant;
        impl IdentifierHasher for Constant {
            fn hash(&self, _data: &[u8]) -> Bytes32 {
                Bytes32([9; 32])
            }
        }
        let derivation = KeyDerivation::new(Arc::new(Constant));
        assert_eq!(derivation.section_hash("x").0, Bytes32([9; 32]));
    }
}

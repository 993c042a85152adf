//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a shared ledger and blob store,
//! and parties that each hold their own edge keys.

use std::sync::Arc;

use keyweave::{EnvelopeCodec, KeyShare, Sharing, SharingConfig};
use keyweave_core::{AccountId, Address, KeyDerivation, KeyMaterial};
use keyweave_crypto::{EdgeKeyProvider, X25519StaticSecret};
use keyweave_store::{MemoryBlobStore, MemoryLedger};

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One ledger, one blob store, one contract.
pub struct SharingFixture {
    pub ledger: Arc<MemoryLedger>,
    pub blobs: Arc<MemoryBlobStore>,
    pub contract: Address,
    pub config: SharingConfig,
}

/// An account with its own key store view.
pub struct Party {
    pub account: AccountId,
    pub keys: Arc<EdgeKeyProvider>,
    pub sharing: Arc<Sharing>,
    pub codec: EnvelopeCodec,
}

impl SharingFixture {
    /// Fixture with caching enabled.
    pub fn new() -> Self {
        Self::with_config(SharingConfig::default())
    }

    /// Fixture with a custom sharing configuration.
    pub fn with_config(config: SharingConfig) -> Self {
        Self {
            ledger: Arc::new(MemoryLedger::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
            contract: Address::from_bytes([0xC0; 20]),
            config,
        }
    }

    /// Create a party. Its secret is derived from `name`, and its self-edge
    /// is already established.
    pub async fn party(&self, name: &str) -> Party {
        let account = AccountId::from(name);
        let seed = blake3::derive_key("keyweave-testkit party seed", name.as_bytes());
        let keys = Arc::new(EdgeKeyProvider::new(
            account.clone(),
            X25519StaticSecret::from_bytes(seed),
            KeyDerivation::default(),
        ));
        keys.add_peer(&account, &keys.public_key()).await;

        let sharing = Arc::new(Sharing::new(
            self.ledger.clone(),
            self.blobs.clone(),
            keys.clone(),
            self.config.clone(),
        ));
        let codec = EnvelopeCodec::from_sharing(sharing.clone());

        Party {
            account,
            keys,
            sharing,
            codec,
        }
    }

    /// Establish the edge between two parties, in both directions.
    pub async fn connect(a: &Party, b: &Party) {
        a.keys.add_peer(&b.account, &b.keys.public_key()).await;
        b.keys.add_peer(&a.account, &a.keys.public_key()).await;
    }
}

impl Default for SharingFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Party {
    /// Share `key` with `partner` for `section` from `block`, on the
    /// fixture's contract.
    pub async fn share_with(
        &self,
        fixture: &SharingFixture,
        partner: &Party,
        section: &str,
        block: u64,
        key: &KeyMaterial,
    ) -> keyweave_sharing::SharingReport {
        let share = KeyShare::new(
            self.account.clone(),
            partner.account.clone(),
            section,
            block,
            key.clone(),
        );
        self.sharing
            .add_sharing(fixture.contract, share, false)
            .await
            .expect("add_sharing failed in fixture")
    }
}

/// A fixture plus fully connected parties, one per name.
pub async fn multi_party_fixtures(
    names: &[&str],
    config: SharingConfig,
) -> (SharingFixture, Vec<Party>) {
    let fixture = SharingFixture::with_config(config);
    let mut parties = Vec::with_capacity(names.len());
    for name in names {
        parties.push(fixture.party(name).await);
    }
    for i in 0..parties.len() {
        for j in (i + 1)..parties.len() {
            SharingFixture::connect(&parties[i], &parties[j]).await;
        }
    }
    (fixture, parties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_party_secret_is_deterministic() {
        let one = SharingFixture::new();
        let two = SharingFixture::new();
        let a = one.party("alice").await;
        let b = two.party("alice").await;
        assert_eq!(a.keys.public_key(), b.keys.public_key());

        let c = one.party("carol").await;
        assert_ne!(a.keys.public_key(), c.keys.public_key());
    }

    #[tokio::test]
    async fn test_connected_parties_share_edge() {
        let (_fixture, parties) =
            multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
        let derivation = KeyDerivation::default();
        let edge = derivation.edge_hash(&parties[0].account, &parties[1].account);

        let from_a = parties[0].keys.edge_key(&edge).await;
        let from_b = parties[1].keys.edge_key(&edge).await;
        assert!(from_a.is_some());
        assert_eq!(from_a, from_b);
    }
}

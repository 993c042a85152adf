//! Pairwise edge keys from X25519 key agreement.
//!
//! Every sharing record is wrapped under the key of the edge between the two
//! accounts involved. [`EdgeKeyProvider`] is a [`KeyProvider`] owned by one
//! account: it agrees a shared secret with each registered peer and derives
//! the edge key from it, so both sides of an edge end up with the same key
//! without ever sending it.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use x25519_dalek::{PublicKey, StaticSecret};

use keyweave_core::{AccountId, CryptoInfo, EdgeHash, KeyDerivation, KeyMaterial};
use keyweave_store::{KeyProvider, Result as StoreResult};

const EDGE_KEY_CONTEXT: &str = "keyweave-v0-edge-key";

/// An X25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct X25519PublicKey(pub [u8; 32]);

impl X25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl From<PublicKey> for X25519PublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

/// An X25519 static secret key.
pub struct X25519StaticSecret(StaticSecret);

impl X25519StaticSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey::from(PublicKey::from(&self.0))
    }

    /// Agree a shared secret with a peer and derive the key for `edge`.
    pub fn edge_key(&self, peer: &X25519PublicKey, edge: &EdgeHash) -> KeyMaterial {
        let shared = self.0.diffie_hellman(&peer.to_dalek());
        let mut hasher = blake3::Hasher::new_derive_key(EDGE_KEY_CONTEXT);
        hasher.update(shared.as_bytes());
        hasher.update(edge.as_bytes());
        KeyMaterial::from_bytes(*hasher.finalize().as_bytes())
    }
}

impl std::fmt::Debug for X25519StaticSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X25519StaticSecret(pub:{})", hex::encode(&self.public_key().0[..4]))
    }
}

/// Key provider that answers edge-key lookups for one local account.
///
/// Lookups are by `CryptoInfo::originator`, which sharing records set to the
/// hex edge hash.
pub struct EdgeKeyProvider {
    account: AccountId,
    secret: X25519StaticSecret,
    derivation: KeyDerivation,
    keys: RwLock<HashMap<EdgeHash, KeyMaterial>>,
}

impl EdgeKeyProvider {
    /// Create a provider for `account` with a fresh X25519 secret.
    pub fn generate(account: AccountId, derivation: KeyDerivation) -> Self {
        Self::new(account, X25519StaticSecret::generate(), derivation)
    }

    /// Create a provider for `account` with an existing secret.
    pub fn new(account: AccountId, secret: X25519StaticSecret, derivation: KeyDerivation) -> Self {
        Self {
            account,
            secret,
            derivation,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// The local account.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The local public key, to hand to peers.
    pub fn public_key(&self) -> X25519PublicKey {
        self.secret.public_key()
    }

    /// Establish the edge with a peer. Returns the edge hash.
    ///
    /// Adding the local account with its own public key establishes the
    /// self-edge.
    pub async fn add_peer(&self, peer: &AccountId, public_key: &X25519PublicKey) -> EdgeHash {
        let edge = self.derivation.edge_hash(&self.account, peer);
        let key = self.secret.edge_key(public_key, &edge);
        tracing::debug!(account = %self.account, %peer, %edge, fp = %key.fingerprint(), "edge established");
        self.keys.write().await.insert(edge, key);
        edge
    }

    /// Register an explicit key for a named context. Returns the edge hash.
    pub async fn add_context_key(&self, context: &str, key: KeyMaterial) -> EdgeHash {
        let edge = self.derivation.context_hash(context);
        self.keys.write().await.insert(edge, key);
        edge
    }

    /// Look up an edge key directly.
    pub async fn edge_key(&self, edge: &EdgeHash) -> Option<KeyMaterial> {
        self.keys.read().await.get(edge).cloned()
    }
}

impl std::fmt::Debug for EdgeKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeKeyProvider")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyProvider for EdgeKeyProvider {
    async fn get_key(&self, info: &CryptoInfo) -> StoreResult<Option<KeyMaterial>> {
        let Ok(edge) = EdgeHash::from_hex(&info.originator) else {
            tracing::debug!(originator = %info.originator, "originator is not an edge hash");
            return Ok(None);
        };
        Ok(self.edge_key(&edge).await)
    }
}

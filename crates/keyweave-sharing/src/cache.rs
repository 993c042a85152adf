//! Process-local caches for the sharing key store.
//!
//! Three maps, all keyed by [`SlotKey`]:
//! - on-chain hashes primed through `add_hash_to_cache`
//! - loaded graphs
//! - unwrapped keys, by `(partner, section, requested block)`
//!
//! Every entry for a slot is dropped together. A disabled cache stores
//! nothing and answers every lookup with a miss.

use std::collections::HashMap;

use tokio::sync::RwLock;

use keyweave_core::{BlockKey, Bytes32, KeyMaterial, PartnerHash, SectionHash, SlotKey};

use crate::graph::SharingGraph;

/// Lookup path of an unwrapped key.
pub type KeyPath = (PartnerHash, SectionHash, BlockKey);

/// Graph and key caches.
#[derive(Debug)]
pub struct SharingCache {
    enabled: bool,
    hashes: RwLock<HashMap<SlotKey, Bytes32>>,
    graphs: RwLock<HashMap<SlotKey, SharingGraph>>,
    keys: RwLock<HashMap<SlotKey, HashMap<KeyPath, KeyMaterial>>>,
}

impl SharingCache {
    /// Create a cache.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hashes: RwLock::new(HashMap::new()),
            graphs: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Whether the cache stores anything.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) async fn hash(&self, slot: &SlotKey) -> Option<Bytes32> {
        if !self.enabled {
            return None;
        }
        self.hashes.read().await.get(slot).copied()
    }

    pub(crate) async fn put_hash(&self, slot: SlotKey, hash: Bytes32) {
        if self.enabled {
            self.hashes.write().await.insert(slot, hash);
        }
    }

    pub(crate) async fn graph(&self, slot: &SlotKey) -> Option<SharingGraph> {
        if !self.enabled {
            return None;
        }
        self.graphs.read().await.get(slot).cloned()
    }

    pub(crate) async fn put_graph(&self, slot: SlotKey, graph: SharingGraph) {
        if self.enabled {
            self.graphs.write().await.insert(slot, graph);
        }
    }

    pub(crate) async fn key(&self, slot: &SlotKey, path: &KeyPath) -> Option<KeyMaterial> {
        if !self.enabled {
            return None;
        }
        self.keys.read().await.get(slot)?.get(path).cloned()
    }

    pub(crate) async fn put_key(&self, slot: SlotKey, path: KeyPath, key: KeyMaterial) {
        if self.enabled {
            self.keys
                .write()
                .await
                .entry(slot)
                .or_default()
                .insert(path, key);
        }
    }

    /// Drop every cached entry for one slot.
    pub async fn invalidate(&self, slot: &SlotKey) {
        self.hashes.write().await.remove(slot);
        self.graphs.write().await.remove(slot);
        self.keys.write().await.remove(slot);
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.hashes.write().await.clear();
        self.graphs.write().await.clear();
        self.keys.write().await.clear();
    }

    /// Number of slots with a cached graph.
    pub async fn graph_count(&self) -> usize {
        self.graphs.read().await.len()
    }
}

impl Default for SharingCache {
    fn default() -> Self {
        Self::new(true)
    }
}

//! The sharing key store.
//!
//! A [`Sharing`] reads and writes encrypted key graphs. Each graph is a blob
//! in the blob store whose hash sits in a contract slot. Keys in the graph are
//! wrapped under pairwise edge keys supplied by a [`KeyProvider`], so a reader
//! can only unwrap the entries on edges it holds.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};

use keyweave_core::{
    AccountId, Algorithm, BlockKey, Bytes32, KeyDerivation, KeyMaterial, PartnerHash,
    SectionHash, SlotId, SlotKey,
};
use keyweave_crypto::{CryptoError, CryptorRegistry, Payload};
use keyweave_store::{
    bytes32_arg, methods, parse_bytes32, BlobStore, KeyProvider, TransactionExecutor, TxOptions,
};

use crate::cache::SharingCache;
use crate::config::SharingConfig;
use crate::error::{Result, SharingError};
use crate::graph::{KeyRecord, SharingGraph};
use crate::history::KeyHistoryPager;
use crate::share::{HashKeyPropagation, KeyShare, SharingReport};

/// Cryptor used to wrap keys under edge keys.
pub const RECORD_ALGORITHM: Algorithm = Algorithm::Content;

/// Sharing key store over a ledger, a blob store, and a key provider.
pub struct Sharing {
    executor: Arc<dyn TransactionExecutor>,
    blobs: Arc<dyn BlobStore>,
    key_provider: Arc<dyn KeyProvider>,
    registry: CryptorRegistry,
    derivation: KeyDerivation,
    cache: SharingCache,
    config: SharingConfig,
}

impl Sharing {
    /// Create a key store with the default cryptors and Blake3 derivation.
    pub fn new(
        executor: Arc<dyn TransactionExecutor>,
        blobs: Arc<dyn BlobStore>,
        key_provider: Arc<dyn KeyProvider>,
        config: SharingConfig,
    ) -> Self {
        Self {
            registry: CryptorRegistry::with_blob_fan_out(Arc::clone(&blobs), config.fan_out),
            executor,
            blobs,
            key_provider,
            derivation: KeyDerivation::default(),
            cache: SharingCache::new(config.cache_enabled),
            config,
        }
    }

    /// Replace the cryptor registry.
    pub fn with_registry(mut self, registry: CryptorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the identifier derivation.
    pub fn with_derivation(mut self, derivation: KeyDerivation) -> Self {
        self.derivation = derivation;
        self
    }

    /// Identifier derivation in use.
    pub fn derivation(&self) -> &KeyDerivation {
        &self.derivation
    }

    /// Cryptor registry in use.
    pub fn registry(&self) -> &CryptorRegistry {
        &self.registry
    }

    /// Configuration.
    pub fn config(&self) -> &SharingConfig {
        &self.config
    }

    /// The caches.
    pub fn cache(&self) -> &SharingCache {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Key shared with `partner` for `section`, valid at `block`.
    ///
    /// Falls back to the catch-all section when the partner has no entry for
    /// `section`. Returns `Ok(None)` when nothing usable is shared.
    pub async fn get_key(
        &self,
        slot: impl Into<SlotKey>,
        partner: &AccountId,
        section: &str,
        block: impl Into<BlockKey>,
    ) -> Result<Option<KeyMaterial>> {
        let slot = slot.into();
        let block = block.into();
        let path = (
            self.derivation.partner_hash(partner),
            self.derivation.section_hash(section),
            block,
        );

        if let Some(key) = self.cache.key(&slot, &path).await {
            tracing::trace!(%slot, %partner, section, %block, "key cache hit");
            return Ok(Some(key));
        }

        let graph = self.get_sharings(slot.clone()).await?;
        let key = self.key_from_graph(&graph, &path.0, &path.1, &block).await?;
        match &key {
            Some(key) => self.cache.put_key(slot, path, key.clone()).await,
            None => tracing::debug!(%slot, %partner, section, %block, "no key shared"),
        }
        Ok(key)
    }

    /// Hash key of `partner`.
    pub async fn get_hash_key(
        &self,
        slot: impl Into<SlotKey>,
        partner: &AccountId,
    ) -> Result<Option<KeyMaterial>> {
        self.get_key(slot, partner, keyweave_core::CATCH_ALL_SECTION, BlockKey::HashKey)
            .await
    }

    /// Every unwrappable key of a partner and section, by block.
    pub async fn get_key_history(
        &self,
        slot: impl Into<SlotKey>,
        partner: &AccountId,
        section: &str,
    ) -> Result<BTreeMap<u64, KeyMaterial>> {
        let entries = self.history_entries(slot.into(), partner, section).await?;
        let keys = self.unwrap_entries(&entries).await?;
        Ok(keys.into_iter().collect())
    }

    /// Page through the key history of a partner and section.
    ///
    /// The graph is read once; pages are unwrapped on demand.
    pub async fn key_history_pages(
        &self,
        slot: impl Into<SlotKey>,
        partner: &AccountId,
        section: &str,
        page_size: usize,
    ) -> Result<KeyHistoryPager<'_>> {
        let entries = self.history_entries(slot.into(), partner, section).await?;
        Ok(KeyHistoryPager::new(self, entries, page_size))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Wrap `share.key` under its edge key and add it to `graph`.
    ///
    /// Nothing is persisted. Fails with `NoEdgeKey` when the key provider
    /// does not know the edge.
    pub async fn extend_sharings(
        &self,
        mut graph: SharingGraph,
        share: &KeyShare,
    ) -> Result<SharingGraph> {
        let edge = match &share.context {
            Some(context) => self.derivation.context_hash(context),
            None => self.derivation.edge_hash(&share.originator, &share.partner),
        };

        let cryptor = self.registry.resolve(RECORD_ALGORITHM)?;
        let mut crypto_info = cryptor.crypto_info(&edge.to_hex());
        let edge_key = self
            .key_provider
            .get_key(&crypto_info)
            .await?
            .ok_or_else(|| SharingError::NoEdgeKey {
                originator: share.originator.clone(),
                partner: share.partner.clone(),
                slot: None,
            })?;

        let private = cryptor
            .encrypt(&Payload::Data(share.key.as_bytes().to_vec()), Some(&edge_key))
            .await?;
        crypto_info.block = share.block.block();

        graph.insert(
            self.derivation.partner_hash(&share.partner),
            self.derivation.section_hash(&share.section),
            share.block,
            KeyRecord {
                private,
                crypto_info,
            },
        );
        tracing::debug!(
            originator = %share.originator,
            partner = %share.partner,
            section = %share.section,
            block = %share.block,
            %edge,
            "sharing extended"
        );
        Ok(graph)
    }

    /// Add one share and persist.
    ///
    /// Unless the share is itself a hash key, the partner also receives the
    /// originator's hash key when it has none. The report says what happened.
    pub async fn add_sharing(
        &self,
        slot: impl Into<SlotKey>,
        share: KeyShare,
        is_hash_key: bool,
    ) -> Result<SharingReport> {
        let slot = slot.into();
        let graph = self.get_sharings(slot.clone()).await?;
        let graph = self
            .extend_sharings(graph, &share)
            .await
            .map_err(|e| e.in_slot(&slot))?;

        let (graph, hash_key) = if is_hash_key {
            (graph, HashKeyPropagation::NotRequested)
        } else {
            self.propagate_hash_key(&slot, graph, &share).await?
        };

        self.save_sharings_to_contract(slot, &graph, &share.originator)
            .await?;
        Ok(SharingReport { hash_key })
    }

    /// Share one key with many partners in a single save.
    pub async fn bump_sharings(
        &self,
        slot: impl Into<SlotKey>,
        originator: &AccountId,
        partners: &[AccountId],
        section: &str,
        block: impl Into<BlockKey>,
        key: &KeyMaterial,
    ) -> Result<()> {
        let slot = slot.into();
        if partners.is_empty() {
            tracing::debug!(%slot, "bump with no partners");
            return Ok(());
        }

        let template = KeyShare::new(
            originator.clone(),
            originator.clone(),
            section,
            block,
            key.clone(),
        );
        let mut graph = self.get_sharings(slot.clone()).await?;
        for partner in partners {
            graph = self
                .extend_sharings(graph, &template.for_partner(partner.clone()))
                .await
                .map_err(|e| e.in_slot(&slot))?;
        }

        self.save_sharings_to_contract(slot, &graph, originator)
            .await?;
        Ok(())
    }

    /// Remove every block of a partner and section. Returns whether anything
    /// was removed; nothing is written when it was not there.
    pub async fn remove_sharing(
        &self,
        slot: impl Into<SlotKey>,
        originator: &AccountId,
        partner: &AccountId,
        section: &str,
    ) -> Result<bool> {
        let slot = slot.into();
        let mut graph = self.get_sharings(slot.clone()).await?;
        let removed = graph.remove_section(
            &self.derivation.partner_hash(partner),
            &self.derivation.section_hash(section),
        );
        if !removed {
            tracing::debug!(%slot, %partner, section, "nothing to remove");
            return Ok(false);
        }

        self.save_sharings_to_contract(slot, &graph, originator)
            .await?;
        Ok(true)
    }

    /// Make sure `partner` has a hash key and return it.
    ///
    /// An existing entry wins. Otherwise the supplied key, the originator's
    /// hash key, or a freshly generated one is shared, in that order.
    pub async fn ensure_hash_key(
        &self,
        slot: impl Into<SlotKey>,
        originator: &AccountId,
        partner: &AccountId,
        hash_key: Option<KeyMaterial>,
    ) -> Result<KeyMaterial> {
        let slot = slot.into();
        let graph = self.get_sharings(slot.clone()).await?;
        let catch_all = self.derivation.catch_all_section();
        let partner_hash = self.derivation.partner_hash(partner);

        if graph
            .get(&partner_hash, &catch_all, &BlockKey::HashKey)
            .is_some()
        {
            return self
                .key_from_graph(&graph, &partner_hash, &catch_all, &BlockKey::HashKey)
                .await?
                .ok_or(SharingError::HashKeyUnreadable {
                    slot,
                    partner: partner_hash,
                });
        }

        let key = match hash_key {
            Some(key) => key,
            None => {
                let originator_hash = self.derivation.partner_hash(originator);
                match self
                    .key_from_graph(&graph, &originator_hash, &catch_all, &BlockKey::HashKey)
                    .await?
                {
                    Some(key) => key,
                    None => self.registry.resolve(Algorithm::HashCipher)?.generate_key(),
                }
            }
        };

        let share = KeyShare::hash_key(originator.clone(), partner.clone(), key.clone());
        let graph = self
            .extend_sharings(graph, &share)
            .await
            .map_err(|e| e.in_slot(&slot))?;
        self.save_sharings_to_contract(slot, &graph, originator)
            .await?;
        Ok(key)
    }

    /// Remove entries from an in-memory graph.
    ///
    /// Without a section the whole partner goes; with a section but no block
    /// the whole section goes; with both, one entry goes.
    pub fn trim_sharings(
        &self,
        mut graph: SharingGraph,
        partner: &AccountId,
        section: Option<&str>,
        block: Option<BlockKey>,
    ) -> SharingGraph {
        let partner = self.derivation.partner_hash(partner);
        match (section, block) {
            (None, _) => {
                graph.remove_partner(&partner);
            }
            (Some(section), None) => {
                graph.remove_section(&partner, &self.derivation.section_hash(section));
            }
            (Some(section), Some(block)) => {
                graph.remove_block(&partner, &self.derivation.section_hash(section), &block);
            }
        }
        graph
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypted graph of a slot, through the cache.
    pub async fn get_sharings(&self, slot: impl Into<SlotKey>) -> Result<SharingGraph> {
        let slot = slot.into();
        if let Some(graph) = self.cache.graph(&slot).await {
            return Ok(graph);
        }

        let hash = match self.cache.hash(&slot).await {
            Some(hash) => hash,
            None => self.sharing_hash(&slot).await?,
        };
        let graph = self.load_graph(&slot, &hash).await?;
        self.cache.put_graph(slot, graph.clone()).await;
        Ok(graph)
    }

    /// Encrypted graph of a slot, read from the contract and blob store.
    pub async fn get_sharings_from_contract(
        &self,
        slot: impl Into<SlotKey>,
    ) -> Result<SharingGraph> {
        let slot = slot.into();
        let hash = self.sharing_hash(&slot).await?;
        self.load_graph(&slot, &hash).await
    }

    /// Upload `graph` and point the slot at it. Returns the blob hash.
    pub async fn save_sharings_to_contract(
        &self,
        slot: impl Into<SlotKey>,
        graph: &SharingGraph,
        originator: &AccountId,
    ) -> Result<Bytes32> {
        let slot = slot.into();
        let bytes = graph
            .to_bytes()
            .map_err(|e| SharingError::Serialization(e.to_string()))?;
        let hash = self
            .blobs
            .add(&self.config.blob_name, Bytes::from(bytes))
            .await?;

        let options = TxOptions::sender(originator.clone());
        match &slot.slot {
            None => {
                self.executor
                    .transact(
                        &slot.address,
                        methods::SET_SHARING,
                        &options,
                        vec![bytes32_arg(&hash)],
                    )
                    .await?
            }
            Some(id) => {
                self.executor
                    .transact(
                        &slot.address,
                        methods::SET_MULTI_SHARING,
                        &options,
                        vec![bytes32_arg(&self.slot_hash(id)), bytes32_arg(&hash)],
                    )
                    .await?
            }
        };

        self.cache.invalidate(&slot).await;
        tracing::info!(%slot, %hash, partners = graph.partner_count(), "sharing graph saved");
        Ok(hash)
    }

    /// On-chain hash of a slot's graph. Zero means no graph yet.
    pub async fn sharing_hash(&self, slot: &SlotKey) -> Result<Bytes32> {
        let value = match &slot.slot {
            None => {
                self.executor
                    .call(&slot.address, methods::SHARING, vec![])
                    .await?
            }
            Some(id) => {
                self.executor
                    .call(
                        &slot.address,
                        methods::MULTI_SHARINGS,
                        vec![bytes32_arg(&self.slot_hash(id))],
                    )
                    .await?
            }
        };
        Ok(parse_bytes32(&value)?)
    }

    /// Prime the cache with a known on-chain hash, skipping the next call.
    pub async fn add_hash_to_cache(&self, slot: impl Into<SlotKey>, hash: Bytes32) {
        let slot = slot.into();
        self.cache.invalidate(&slot).await;
        self.cache.put_hash(slot, hash).await;
    }

    /// Drop every cached graph, hash, and key.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        tracing::debug!("sharing caches cleared");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn slot_hash(&self, slot: &SlotId) -> Bytes32 {
        self.derivation.hash(slot.as_str().as_bytes())
    }

    async fn load_graph(&self, slot: &SlotKey, hash: &Bytes32) -> Result<SharingGraph> {
        if hash.is_zero() {
            tracing::debug!(%slot, "no sharing graph yet");
            return Ok(SharingGraph::new());
        }
        let bytes = self.blobs.get(hash).await?;
        SharingGraph::from_bytes(&bytes).map_err(|e| SharingError::MalformedGraph {
            slot: slot.clone(),
            reason: e.to_string(),
        })
    }

    async fn key_from_graph(
        &self,
        graph: &SharingGraph,
        partner: &PartnerHash,
        section: &SectionHash,
        block: &BlockKey,
    ) -> Result<Option<KeyMaterial>> {
        let catch_all = self.derivation.catch_all_section();
        match graph.resolve(partner, section, &catch_all, block) {
            Some((_, record)) => self.unwrap_record(record).await,
            None => Ok(None),
        }
    }

    async fn unwrap_record(&self, record: &KeyRecord) -> Result<Option<KeyMaterial>> {
        let Some(edge_key) = self.key_provider.get_key(&record.crypto_info).await? else {
            tracing::debug!(edge = %record.crypto_info.originator, "no edge key for record");
            return Ok(None);
        };

        let cryptor = self.registry.resolve_by_crypto_info(&record.crypto_info)?;
        let payload = cryptor.decrypt(&record.private, Some(&edge_key)).await?;
        let bytes = payload.into_data().ok_or_else(|| {
            CryptoError::DecryptionFailed("key record did not decrypt to bytes".into())
        })?;
        let key = KeyMaterial::from_slice(&bytes)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
        Ok(Some(key))
    }

    async fn history_entries(
        &self,
        slot: SlotKey,
        partner: &AccountId,
        section: &str,
    ) -> Result<Vec<(u64, KeyRecord)>> {
        let graph = self.get_sharings(slot).await?;
        Ok(graph.history(
            &self.derivation.partner_hash(partner),
            &self.derivation.section_hash(section),
            &self.derivation.catch_all_section(),
        ))
    }

    /// Unwrap entries with bounded concurrency, keeping order and skipping
    /// records whose edge key is unknown.
    pub(crate) async fn unwrap_entries(
        &self,
        entries: &[(u64, KeyRecord)],
    ) -> Result<Vec<(u64, KeyMaterial)>> {
        let unwraps: Vec<_> = entries
            .iter()
            .map(|(block, record)| async move {
                let key = self.unwrap_record(record).await?;
                Ok::<_, SharingError>(key.map(|key| (*block, key)))
            })
            .collect();

        let keys: Vec<Option<(u64, KeyMaterial)>> = stream::iter(unwraps)
            .buffered(self.config.fan_out.max(1))
            .try_collect()
            .await?;
        Ok(keys.into_iter().flatten().collect())
    }

    async fn propagate_hash_key(
        &self,
        slot: &SlotKey,
        graph: SharingGraph,
        share: &KeyShare,
    ) -> Result<(SharingGraph, HashKeyPropagation)> {
        let catch_all = self.derivation.catch_all_section();
        let partner = self.derivation.partner_hash(&share.partner);
        if graph.get(&partner, &catch_all, &BlockKey::HashKey).is_some() {
            tracing::debug!(%slot, partner = %share.partner, "partner already has a hash key");
            return Ok((graph, HashKeyPropagation::AlreadyPresent));
        }

        let originator = self.derivation.partner_hash(&share.originator);
        let Some(hash_key) = self
            .key_from_graph(&graph, &originator, &catch_all, &BlockKey::HashKey)
            .await?
        else {
            tracing::debug!(
                %slot,
                originator = %share.originator,
                "originator has no hash key to propagate"
            );
            return Ok((graph, HashKeyPropagation::OriginatorHasNone));
        };

        let propagated = KeyShare::hash_key(
            share.originator.clone(),
            share.partner.clone(),
            hash_key,
        );
        let graph = self
            .extend_sharings(graph, &propagated)
            .await
            .map_err(|e| e.in_slot(slot))?;
        Ok((graph, HashKeyPropagation::Propagated))
    }
}

impl std::fmt::Debug for Sharing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sharing")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

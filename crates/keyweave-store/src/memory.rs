//! In-memory collaborators.
//!
//! These are test doubles with the same observable semantics as a ledger,
//! a content-addressed store, and a keystore, plus counters so tests can
//! assert how much I/O an operation performed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::RwLock;

use keyweave_core::{Address, Bytes32, CryptoInfo, EdgeHash, KeyMaterial};

use crate::contract::{bytes32_arg, methods, parse_bytes32};
use crate::error::{Result, StoreError};
use crate::traits::{BlobStore, KeyProvider, TransactionExecutor, TxOptions};

/// Storage of one sharing contract.
#[derive(Debug, Default, Clone)]
struct ContractSlots {
    sharing: Bytes32,
    multi: HashMap<Bytes32, Bytes32>,
}

/// In-memory ledger implementing the sharing contract methods.
#[derive(Default)]
pub struct MemoryLedger {
    contracts: RwLock<HashMap<Address, ContractSlots>>,
    calls: AtomicUsize,
    writes: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read-only calls served.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of successful state-changing transactions.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make the next transaction fail.
    pub fn fail_next_transaction(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Overwrite a contract's single sharing hash, bypassing transactions.
    ///
    /// Simulates a write by another process.
    pub async fn set_sharing_out_of_band(&self, contract: Address, hash: Bytes32) {
        self.contracts
            .write()
            .await
            .entry(contract)
            .or_default()
            .sharing = hash;
    }

    fn arg(args: &[Value], index: usize, method: &str) -> Result<Bytes32> {
        let value = args.get(index).ok_or_else(|| {
            StoreError::InvalidArgument(format!("{method}: missing argument {index}"))
        })?;
        parse_bytes32(value)
    }
}

#[async_trait]
impl TransactionExecutor for MemoryLedger {
    async fn call(&self, contract: &Address, method: &str, args: Vec<Value>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let contracts = self.contracts.read().await;
        let slots = contracts.get(contract).cloned().unwrap_or_default();

        match method {
            methods::SHARING => Ok(bytes32_arg(&slots.sharing)),
            methods::MULTI_SHARINGS => {
                let slot = Self::arg(&args, 0, method)?;
                let hash = slots.multi.get(&slot).copied().unwrap_or(Bytes32::ZERO);
                Ok(bytes32_arg(&hash))
            }
            _ => Err(StoreError::UnknownMethod {
                contract: *contract,
                method: method.to_owned(),
            }),
        }
    }

    async fn transact(
        &self,
        contract: &Address,
        method: &str,
        options: &TxOptions,
        args: Vec<Value>,
    ) -> Result<Value> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Transaction {
                contract: *contract,
                method: method.to_owned(),
                reason: "injected failure".into(),
            });
        }

        let mut contracts = self.contracts.write().await;
        let slots = contracts.entry(*contract).or_default();

        match method {
            methods::SET_SHARING => {
                slots.sharing = Self::arg(&args, 0, method)?;
            }
            methods::SET_MULTI_SHARING => {
                let slot = Self::arg(&args, 0, method)?;
                let hash = Self::arg(&args, 1, method)?;
                slots.multi.insert(slot, hash);
            }
            _ => {
                return Err(StoreError::UnknownMethod {
                    contract: *contract,
                    method: method.to_owned(),
                })
            }
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(%contract, method, from = %options.from, "transaction applied");
        Ok(Value::Null)
    }
}

/// In-memory content-addressed blob store. Hashes are Blake3 of the content.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<Bytes32, Bytes>>,
    uploads: AtomicUsize,
    fetches: AtomicUsize,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs uploaded.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Number of blobs fetched.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of distinct blobs held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, hash: &Bytes32) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .read()
            .await
            .get(hash)
            .cloned()
            .ok_or(StoreError::BlobNotFound(*hash))
    }

    async fn add(&self, name: &str, content: Bytes) -> Result<Bytes32> {
        let hash = Bytes32(*blake3::hash(&content).as_bytes());
        tracing::trace!(name, %hash, len = content.len(), "blob stored");
        self.blobs.write().await.insert(hash, content);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(hash)
    }
}

/// Keystore holding keys by crypto-info originator.
#[derive(Default)]
pub struct MemoryKeyProvider {
    keys: RwLock<HashMap<String, KeyMaterial>>,
}

impl MemoryKeyProvider {
    /// Create an empty keystore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key for an originator string.
    pub async fn insert(&self, originator: impl Into<String>, key: KeyMaterial) {
        self.keys.write().await.insert(originator.into(), key);
    }

    /// Register a key for an edge.
    pub async fn insert_edge(&self, edge: EdgeHash, key: KeyMaterial) {
        self.insert(edge.to_hex(), key).await;
    }
}

#[async_trait]
impl KeyProvider for MemoryKeyProvider {
    async fn get_key(&self, info: &CryptoInfo) -> Result<Option<KeyMaterial>> {
        Ok(self.keys.read().await.get(&info.originator).cloned())
    }
}

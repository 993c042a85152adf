//! Collaborator traits: the narrow interfaces keyweave consumes.
//!
//! The ledger, the blob store, and the keystore backing edge keys all live
//! outside this workspace. Sharing and envelope code only ever see these
//! traits.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use keyweave_core::{AccountId, Address, Bytes32, CryptoInfo, KeyMaterial};

use crate::error::Result;

/// Options for a state-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOptions {
    /// Account sending the transaction.
    pub from: AccountId,
}

impl TxOptions {
    /// Transaction from the given account.
    pub fn sender(account: AccountId) -> Self {
        Self { from: account }
    }
}

/// Executes contract calls and transactions.
///
/// Arguments and return values are opaque JSON values; encoding them for the
/// contract ABI is the executor's business.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Read-only call.
    async fn call(&self, contract: &Address, method: &str, args: Vec<Value>) -> Result<Value>;

    /// State-changing transaction. Returns whatever the executor derives
    /// from the receipt (`Value::Null` when nothing was requested).
    async fn transact(
        &self,
        contract: &Address,
        method: &str,
        options: &TxOptions,
        args: Vec<Value>,
    ) -> Result<Value>;
}

/// One entry of a batched upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    /// Name or path recorded with the blob.
    pub path: String,
    /// Blob content.
    pub content: Bytes,
}

/// Content-addressed blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob by hash.
    async fn get(&self, hash: &Bytes32) -> Result<Bytes>;

    /// Store a blob and return its hash.
    async fn add(&self, name: &str, content: Bytes) -> Result<Bytes32>;

    /// Store several blobs. Hashes are returned in input order.
    async fn add_multiple(&self, entries: Vec<BlobEntry>) -> Result<Vec<Bytes32>> {
        let mut hashes = Vec::with_capacity(entries.len());
        for entry in entries {
            hashes.push(self.add(&entry.path, entry.content).await?);
        }
        Ok(hashes)
    }
}

/// Resolves symmetric keys from an external keystore.
///
/// Sharing uses this to find the edge key named by `info.originator`.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Look up the key for a crypto context. `Ok(None)` means "not known".
    async fn get_key(&self, info: &CryptoInfo) -> Result<Option<KeyMaterial>>;
}

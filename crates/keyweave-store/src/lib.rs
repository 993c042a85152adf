//! # Keyweave Store
//!
//! Collaborator interfaces for keyweave, plus in-memory implementations.
//!
//! ## Overview
//!
//! Keyweave anchors encrypted key graphs to contract state but implements
//! neither the ledger nor the blob store. It consumes them through three
//! traits:
//!
//! - [`TransactionExecutor`] - contract calls and transactions
//! - [`BlobStore`] - content-addressed blob storage
//! - [`KeyProvider`] - external keystore for pairwise edge keys
//!
//! [`MemoryLedger`], [`MemoryBlobStore`], and [`MemoryKeyProvider`] are
//! in-memory doubles with I/O counters for tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keyweave_store::{BlobStore, MemoryBlobStore};
//!
//! async fn example() {
//!     let store = MemoryBlobStore::new();
//!     let hash = store.add("greeting", b"hello".to_vec().into()).await.unwrap();
//!     let content = store.get(&hash).await.unwrap();
//!     assert_eq!(&content[..], b"hello");
//! }
//! ```

pub mod contract;
pub mod error;
pub mod memory;
pub mod traits;

pub use contract::{bytes32_arg, methods, parse_bytes32};
pub use error::{Result, StoreError};
pub use memory::{MemoryBlobStore, MemoryKeyProvider, MemoryLedger};
pub use traits::{BlobEntry, BlobStore, KeyProvider, TransactionExecutor, TxOptions};

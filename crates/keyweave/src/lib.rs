//! # Keyweave
//!
//! Client-side envelope encryption with contract-anchored key sharing.
//!
//! ## Overview
//!
//! Keyweave lets an account encrypt structured data so that only the partners
//! it has shared keys with can read it:
//!
//! - **Envelopes**: public data, private data, and the crypto info needed to
//!   read the private part
//! - **Sharing graphs**: per-contract key graphs, stored as blobs and anchored
//!   by a hash on the contract
//! - **Cryptors**: pluggable ciphers selected by the envelope's crypto info
//! - **Hash keys**: per-partner keys for deterministic on-chain hash
//!   encryption
//!
//! ## Key Concepts
//!
//! - **Section**: A named part of a contract's data. `"*"` covers every
//!   section.
//! - **Block**: Keys are valid from a block onwards; a lookup takes the most
//!   recent key at or before the requested block.
//! - **Edge key**: The pairwise key two accounts wrap sharing records under.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use keyweave::{Envelope, EnvelopeCodec, KeyShare, Sharing, SharingConfig};
//! use keyweave::core::{AccountId, Address, KeyDerivation, KeyMaterial};
//! use keyweave::crypto::EdgeKeyProvider;
//! use keyweave::store::{MemoryBlobStore, MemoryLedger};
//!
//! async fn example() {
//!     let alice = AccountId::from("alice");
//!     let keys = Arc::new(EdgeKeyProvider::generate(alice.clone(), KeyDerivation::default()));
//!     keys.add_peer(&alice, &keys.public_key()).await;
//!
//!     let sharing = Arc::new(Sharing::new(
//!         Arc::new(MemoryLedger::new()),
//!         Arc::new(MemoryBlobStore::new()),
//!         keys,
//!         SharingConfig::default(),
//!     ));
//!     let codec = EnvelopeCodec::from_sharing(sharing.clone());
//!
//!     // Share a content key with ourselves, then encrypt under it
//!     let contract = Address::from_bytes([1; 20]);
//!     let key = KeyMaterial::generate();
//!     let share = KeyShare::new(alice.clone(), alice.clone(), "balance", 100, key);
//!     sharing.add_sharing(contract, share, false).await.unwrap();
//!
//!     let envelope = Envelope::private(json!(42));
//!     let sealed = codec
//!         .encrypt(&envelope, contract, &alice, "balance", 100, None)
//!         .await
//!         .unwrap();
//!     let opened = codec.decrypt(&sealed, contract, &alice, "balance").await.unwrap();
//!     assert_eq!(opened, json!(42));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `keyweave::core` - Identifiers, block keys, crypto info, derivation
//! - `keyweave::store` - Ledger, blob store, and key provider traits
//! - `keyweave::crypto` - Cryptors and the cryptor registry
//! - `keyweave::sharing` - The sharing key store

pub mod codec;
pub mod envelope;
pub mod error;

// Re-export component crates
pub use keyweave_core as core;
pub use keyweave_crypto as crypto;
pub use keyweave_sharing as sharing;
pub use keyweave_store as store;

// Re-export main types for convenience
pub use codec::{CodecConfig, EnvelopeCodec};
pub use envelope::Envelope;
pub use error::{KeyweaveError, Result};

pub use keyweave_core::{AccountId, Address, Algorithm, BlockKey, CryptoInfo, KeyMaterial, SlotKey};
pub use keyweave_crypto::{Cryptor, CryptorRegistry, FileDescriptor, FilePayload};
pub use keyweave_sharing::{KeyShare, Sharing, SharingConfig, SharingGraph};

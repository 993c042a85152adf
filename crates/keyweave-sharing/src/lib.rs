//! # Keyweave Sharing
//!
//! The sharing key store: encrypted key graphs anchored to contract state.
//!
//! ## Overview
//!
//! A sharing graph maps
//! `partnerHash -> sectionHash -> block | "hashKey" -> wrapped key`.
//! The graph is stored as a JSON blob; the contract holds its hash, either in
//! its single `sharing` slot or in a named multi-sharing slot.
//!
//! Keys are wrapped under the edge key between originator and partner (or
//! under an explicit context edge), so both sides of an edge can unwrap them
//! and nobody else can.
//!
//! ## Lookups
//!
//! - A numeric block resolves to the most recent key at or before it.
//! - A missing section falls back to the catch-all section `"*"`.
//! - "Not shared" is `Ok(None)`, never an error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyweave_core::{AccountId, Address, KeyDerivation, KeyMaterial};
//! use keyweave_crypto::EdgeKeyProvider;
//! use keyweave_sharing::{KeyShare, Sharing, SharingConfig};
//! use keyweave_store::{MemoryBlobStore, MemoryLedger};
//!
//! async fn example() {
//!     let alice = AccountId::from("alice");
//!     let keys = Arc::new(EdgeKeyProvider::generate(alice.clone(), KeyDerivation::default()));
//!     keys.add_peer(&alice, &keys.public_key()).await;
//!
//!     let sharing = Sharing::new(
//!         Arc::new(MemoryLedger::new()),
//!         Arc::new(MemoryBlobStore::new()),
//!         keys,
//!         SharingConfig::default(),
//!     );
//!
//!     let contract = Address::from_bytes([1; 20]);
//!     let key = KeyMaterial::generate();
//!     let share = KeyShare::new(alice.clone(), alice.clone(), "balance", 100, key.clone());
//!     sharing.add_sharing(contract, share, false).await.unwrap();
//!
//!     let found = sharing.get_key(contract, &alice, "balance", 150).await.unwrap();
//!     assert_eq!(found, Some(key));
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod share;
pub mod sharing;

pub use cache::SharingCache;
pub use config::SharingConfig;
pub use error::{Result, SharingError};
pub use graph::{KeyRecord, PartnerSections, SectionKeys, SharingGraph};
pub use history::KeyHistoryPager;
pub use share::{HashKeyPropagation, KeyShare, SharingReport};
pub use sharing::{Sharing, RECORD_ALGORITHM};

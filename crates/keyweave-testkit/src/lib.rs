//! # Keyweave Testkit
//!
//! Testing utilities for keyweave.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Cipher vectors**: Known AES outputs for cross-implementation checks
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Parties sharing one in-memory ledger and blob store
//!
//! ## Cipher Vectors
//!
//! ```rust
//! use keyweave_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{name}: {hex}");
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use keyweave_testkit::fixtures::SharingFixture;
//!
//! async fn example() {
//!     let fixture = SharingFixture::new();
//!     let alice = fixture.party("alice").await;
//!     let bob = fixture.party("bob").await;
//!     SharingFixture::connect(&alice, &bob).await;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, multi_party_fixtures, Party, SharingFixture};
pub use generators::{envelope_value, section_name, ShareParams};
pub use vectors::{all_vectors, verify_all_vectors, CipherVector, VectorKind};

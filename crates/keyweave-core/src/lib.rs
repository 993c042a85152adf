//! # Keyweave Core
//!
//! Pure primitives for keyweave: identifiers, block keys, crypto metadata,
//! and lookup-key derivation.
//!
//! This crate contains no I/O. Everything here is plain data or a pure
//! function over it.
//!
//! ## Key Types
//!
//! - [`Bytes32`] - A contract `bytes32` value (blob hashes, lookup hashes)
//! - [`PartnerHash`], [`SectionHash`], [`EdgeHash`] - Typed lookup hashes
//! - [`BlockKey`] - Block number or the hash-key slot
//! - [`SlotKey`] - Contract plus optional multi-sharing slot
//! - [`CryptoInfo`] - Which cryptor and which key context a ciphertext uses
//! - [`KeyMaterial`] - A 256-bit symmetric key
//! - [`KeyDerivation`] - Partner/section/edge hash derivation

pub mod block;
pub mod crypto_info;
pub mod derivation;
pub mod error;
pub mod key;
pub mod types;

pub use block::{BlockKey, HASH_KEY_SENTINEL};
pub use crypto_info::{Algorithm, CryptoInfo};
pub use derivation::{Blake3Hasher, IdentifierHasher, KeyDerivation, CATCH_ALL_SECTION};
pub use error::{CoreError, Result};
pub use key::{KeyMaterial, KEY_LENGTH, KEY_LENGTH_BITS};
pub use types::{
    AccountId, Address, Bytes32, ContractHandle, ContractRef, EdgeHash, PartnerHash,
    SectionHash, SlotId, SlotKey,
};

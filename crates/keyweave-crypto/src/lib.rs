//! # Keyweave Crypto
//!
//! Symmetric cryptors and the registry that selects them.
//!
//! ## Cryptors
//!
//! | Algorithm | Type | Layout |
//! |---|---|---|
//! | `aes-256-cbc` | [`ContentCryptor`] | `[16-byte IV][ciphertext]` |
//! | `aes-blob` | [`BlobCryptor`] | file bodies in the blob store, wrapper as content |
//! | `aes-ecb` | [`HashCryptor`] | block-wise, length preserving |
//! | `unencrypted` | [`UnencryptedCryptor`] | identity |
//! | `chacha20-poly1305` | [`AeadCryptor`] | `[12-byte nonce][ciphertext][tag]` |
//!
//! [`EdgeKeyProvider`] derives the pairwise keys sharing records are wrapped
//! under, from X25519 agreement between the two accounts.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyweave_core::Algorithm;
//! use keyweave_crypto::{CryptorRegistry, Payload};
//! use keyweave_store::MemoryBlobStore;
//!
//! async fn example() {
//!     let registry = CryptorRegistry::with_defaults(Arc::new(MemoryBlobStore::new()));
//!     let cryptor = registry.resolve(Algorithm::Content).unwrap();
//!     let key = cryptor.generate_key();
//!     let ciphertext = cryptor.encrypt(&Payload::Data(b"42".to_vec()), Some(&key)).await.unwrap();
//!     let plaintext = cryptor.decrypt(&ciphertext, Some(&key)).await.unwrap();
//!     assert_eq!(plaintext, Payload::Data(b"42".to_vec()));
//! }
//! ```

pub mod aead;
pub mod blob;
pub mod content;
pub mod cryptor;
pub mod edge;
pub mod error;
pub mod hash;
pub mod payload;
pub mod registry;
pub mod unencrypted;

pub use aead::AeadCryptor;
pub use blob::{BlobCryptor, DEFAULT_FAN_OUT};
pub use content::{cbc_decrypt, cbc_encrypt, cbc_encrypt_with_iv, ContentCryptor, IV_LENGTH};
pub use cryptor::Cryptor;
pub use edge::{EdgeKeyProvider, X25519PublicKey, X25519StaticSecret};
pub use error::{CryptoError, Result};
pub use hash::HashCryptor;
pub use payload::{FileDescriptor, FilePayload, Payload};
pub use registry::CryptorRegistry;
pub use unencrypted::UnencryptedCryptor;

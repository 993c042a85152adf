//! Deterministic hash cryptor.
//!
//! Encrypts each 16-byte block independently under AES-256 with no IV and no
//! padding, so a 32-byte hash maps to a 32-byte value that still fits a
//! `bytes32` contract slot. Equal inputs give equal outputs under one key.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use async_trait::async_trait;

use keyweave_core::{Algorithm, Bytes32, KeyMaterial};

use crate::cryptor::{require_data, require_key, Cryptor};
use crate::error::{CryptoError, Result};
use crate::payload::Payload;

const BLOCK: usize = 16;

/// Block-wise AES-256 for on-chain hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCryptor;

impl HashCryptor {
    /// Create a hash cryptor.
    pub fn new() -> Self {
        Self
    }

    /// Encrypt a `bytes32` value.
    pub fn encrypt_bytes32(&self, hash: &Bytes32, key: &KeyMaterial) -> Result<Bytes32> {
        let out = apply(key, hash.as_bytes(), Direction::Encrypt)?;
        to_bytes32(&out)
    }

    /// Decrypt a `bytes32` value.
    pub fn decrypt_bytes32(&self, hash: &Bytes32, key: &KeyMaterial) -> Result<Bytes32> {
        let out = apply(key, hash.as_bytes(), Direction::Decrypt)?;
        to_bytes32(&out)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn apply(key: &KeyMaterial, input: &[u8], direction: Direction) -> Result<Vec<u8>> {
    if input.is_empty() || input.len() % BLOCK != 0 {
        let message = format!(
            "hash cipher input must be a non-empty multiple of {BLOCK} bytes, got {}",
            input.len()
        );
        return Err(match direction {
            Direction::Encrypt => CryptoError::InvalidInput(message),
            Direction::Decrypt => CryptoError::DecryptionFailed(message),
        });
    }

    let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));
    let mut out = Vec::with_capacity(input.len());
    for chunk in input.chunks_exact(BLOCK) {
        let mut block = GenericArray::clone_from_slice(chunk);
        match direction {
            Direction::Encrypt => cipher.encrypt_block(&mut block),
            Direction::Decrypt => cipher.decrypt_block(&mut block),
        }
        out.extend_from_slice(&block);
    }
    Ok(out)
}

fn to_bytes32(bytes: &[u8]) -> Result<Bytes32> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidInput(format!("expected 32 bytes, got {}", bytes.len())))?;
    Ok(Bytes32::from_bytes(arr))
}

#[async_trait]
impl Cryptor for HashCryptor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HashCipher
    }

    async fn encrypt(&self, payload: &Payload, key: Option<&KeyMaterial>) -> Result<Vec<u8>> {
        let key = require_key(self.algorithm(), key)?;
        let data = require_data(self.algorithm(), payload)?;
        apply(key, data, Direction::Encrypt)
    }

    async fn decrypt(&self, ciphertext: &[u8], key: Option<&KeyMaterial>) -> Result<Payload> {
        let key = require_key(self.algorithm(), key)?;
        apply(key, ciphertext, Direction::Decrypt).map(Payload::Data)
    }
}

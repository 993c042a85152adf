//! Symmetric key material.

use rand::RngCore;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::decode_fixed;

/// Length of every symmetric key, in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of every symmetric key, in bits (as reported in `CryptoInfo`).
pub const KEY_LENGTH_BITS: u32 = (KEY_LENGTH * 8) as u32;

/// A 256-bit symmetric key.
///
/// `Debug` never prints the key; it shows a short Blake3 fingerprint so two
/// keys can still be told apart in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial([u8; KEY_LENGTH]);

impl KeyMaterial {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; KEY_LENGTH];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            kind: "key",
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Convert to hex (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed(s, "key").map(Self)
    }

    /// Short non-secret identifier for logs.
    pub fn fingerprint(&self) -> String {
        let digest = blake3::derive_key("keyweave-v0-key-fingerprint", &self.0);
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial(fp:{})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_random() {
        assert_ne!(KeyMaterial::generate(), KeyMaterial::generate());
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = KeyMaterial::from_bytes([0x11; 32]);
        assert_eq!(KeyMaterial::from_hex(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert!(KeyMaterial::from_slice(&[0u8; 16]).is_err());
        assert!(KeyMaterial::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = KeyMaterial::from_bytes([0xab; 32]);
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&key.to_hex()));
        assert!(debug.starts_with("KeyMaterial(fp:"));
    }
}

//! Crypto metadata attached to every ciphertext.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Closed set of cryptor algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// AES-256-CBC over a byte buffer, IV-prefixed.
    #[serde(rename = "aes-256-cbc")]
    Content,
    /// AES-256-CBC over file descriptors, file bodies offloaded to the blob store.
    #[serde(rename = "aes-blob")]
    Blob,
    /// Deterministic block-wise AES-256 for hashes.
    #[serde(rename = "aes-ecb")]
    HashCipher,
    /// Identity transform.
    #[serde(rename = "unencrypted")]
    Unencrypted,
    /// ChaCha20-Poly1305, nonce-prefixed.
    #[serde(rename = "chacha20-poly1305")]
    Aead,
}

impl Algorithm {
    /// Every known algorithm.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Content,
        Algorithm::Blob,
        Algorithm::HashCipher,
        Algorithm::Unencrypted,
        Algorithm::Aead,
    ];

    /// Wire identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Content => "aes-256-cbc",
            Algorithm::Blob => "aes-blob",
            Algorithm::HashCipher => "aes-ecb",
            Algorithm::Unencrypted => "unencrypted",
            Algorithm::Aead => "chacha20-poly1305",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAlgorithm(s.to_owned()))
    }
}

/// Identifies which cryptor decodes a ciphertext and in which key context.
///
/// `originator` is the context the key was resolved from: for wrapped
/// sharing keys it is the hex edge hash, for content it is the account or
/// contract that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoInfo {
    /// Cryptor algorithm.
    pub algorithm: Algorithm,
    /// Key context.
    pub originator: String,
    /// Block the key was valid at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
    /// Key length in bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_length: Option<u32>,
}

impl CryptoInfo {
    /// Create crypto info for an algorithm and originator.
    pub fn new(algorithm: Algorithm, originator: impl Into<String>) -> Self {
        Self {
            algorithm,
            originator: originator.into(),
            block: None,
            key_length: None,
        }
    }

    /// Set the block.
    pub fn with_block(mut self, block: u64) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the key length in bits.
    pub fn with_key_length(mut self, bits: u32) -> Self {
        self.key_length = Some(bits);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let info = CryptoInfo::new(Algorithm::Content, "0xabc")
            .with_block(100)
            .with_key_length(256);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "algorithm": "aes-256-cbc",
                "originator": "0xabc",
                "block": 100,
                "keyLength": 256,
            })
        );
    }

    #[test]
    fn test_optional_fields_omitted() {
        let info = CryptoInfo::new(Algorithm::Unencrypted, "me");
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("block"));
        assert!(!json.contains("keyLength"));
        let back: CryptoInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_algorithm_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert!("aes".parse::<Algorithm>().is_err());
    }
}

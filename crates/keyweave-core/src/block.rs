//! Block keys: the third level of the sharing graph.
//!
//! Keys are stored per block number so that data written at block `n` is
//! decrypted with the key that was current at `n`. One extra slot, the
//! hash key, is addressed by name instead of by block.
//!
//! On the wire every block key is a JSON object key and therefore a string.
//! Parsing back to a number happens here, never by string comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Literal used on the wire for the hash-key slot.
pub const HASH_KEY_SENTINEL: &str = "hashKey";

/// A block-number slot or the dedicated hash-key slot.
///
/// Ordering is numeric for blocks; `HashKey` sorts after every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKey {
    /// Key valid from this block onwards.
    Block(u64),
    /// The per-partner hash-encryption key.
    HashKey,
}

impl BlockKey {
    /// Request the most recent key.
    pub const LATEST: Self = BlockKey::Block(u64::MAX);

    /// The block number, if this is a numeric slot.
    pub fn block(&self) -> Option<u64> {
        match self {
            BlockKey::Block(n) => Some(*n),
            BlockKey::HashKey => None,
        }
    }

    /// Whether this is the hash-key slot.
    pub fn is_hash_key(&self) -> bool {
        matches!(self, BlockKey::HashKey)
    }
}

impl From<u64> for BlockKey {
    fn from(block: u64) -> Self {
        BlockKey::Block(block)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKey::Block(n) => write!(f, "{n}"),
            BlockKey::HashKey => f.write_str(HASH_KEY_SENTINEL),
        }
    }
}

impl FromStr for BlockKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == HASH_KEY_SENTINEL {
            return Ok(BlockKey::HashKey);
        }
        s.parse::<u64>()
            .map(BlockKey::Block)
            .map_err(|_| CoreError::InvalidBlockKey(s.to_owned()))
    }
}

impl Serialize for BlockKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Strong type definitions for keyweave.
//!
//! All identifiers are newtypes so that a partner hash can never be passed
//! where a section hash is expected, and a multi-sharing slot can never be
//! confused with "no slot".

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Decode a hex string with an optional `0x` prefix into a fixed-size array.
pub(crate) fn decode_fixed<const N: usize>(s: &str, kind: &'static str) -> Result<[u8; N]> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw)?;
    if bytes.len() != N {
        return Err(CoreError::InvalidLength {
            kind,
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// A 32-byte value as stored in a contract `bytes32` slot.
///
/// Used for blob hashes written on-chain and for every derived lookup hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed(s, "bytes32").map(Self)
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The all-zero value. On-chain, this means "nothing stored yet".
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({})", &self.to_hex()[..18])
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Bytes32 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Bytes32);

        impl $name {
            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                self.0.as_bytes()
            }

            /// Convert to `0x`-prefixed hex.
            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }

            /// Parse from hex, with or without `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self> {
                Bytes32::from_hex(s).map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..18])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Bytes32> for $name {
            fn from(value: Bytes32) -> Self {
                Self(value)
            }
        }
    };
}

hash_newtype!(
    /// One-way hash of a partner account. First level of the sharing graph.
    PartnerHash
);
hash_newtype!(
    /// One-way hash of a section name. Second level of the sharing graph.
    SectionHash
);
hash_newtype!(
    /// Identifies the pairwise secret two accounts use to wrap shared keys.
    EdgeHash
);

/// A 20-byte contract address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed(s, "address").map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// An account identifier (e.g. an externally owned account address).
///
/// Opaque to this crate; only ever hashed or compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of a multi-sharing slot within one contract.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    /// Wrap a slot name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the slot name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A contract handle that has already been resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    /// On-chain address.
    pub address: Address,
    /// Free-form label (contract type or name), for logs only.
    pub label: Option<String>,
}

impl ContractHandle {
    /// Create a handle for the given address.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A reference to a contract: either a bare address or a loaded handle.
///
/// Resolved once at the API boundary through [`ContractRef::address`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractRef {
    /// Bare on-chain address.
    Address(Address),
    /// Handle produced by a contract loader.
    Loaded(ContractHandle),
}

impl ContractRef {
    /// The contract address this reference points to.
    pub fn address(&self) -> Address {
        match self {
            ContractRef::Address(address) => *address,
            ContractRef::Loaded(handle) => handle.address,
        }
    }
}

impl From<Address> for ContractRef {
    fn from(address: Address) -> Self {
        ContractRef::Address(address)
    }
}

impl From<ContractHandle> for ContractRef {
    fn from(handle: ContractHandle) -> Self {
        ContractRef::Loaded(handle)
    }
}

/// Composite key for one sharing graph: a contract plus an optional
/// multi-sharing slot.
///
/// `slot: None` is the contract's single `sharing` slot and never collides
/// with a named slot, whatever its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    /// Contract holding the on-chain hash.
    pub address: Address,
    /// Named multi-sharing slot, if any.
    pub slot: Option<SlotId>,
}

impl SlotKey {
    /// The single sharing slot of a contract.
    pub fn single(address: Address) -> Self {
        Self {
            address,
            slot: None,
        }
    }

    /// A named multi-sharing slot of a contract.
    pub fn multi(address: Address, slot: impl Into<SlotId>) -> Self {
        Self {
            address,
            slot: Some(slot.into()),
        }
    }

    /// Whether this key addresses a multi-sharing slot.
    pub fn is_multi(&self) -> bool {
        self.slot.is_some()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}#{}", self.address, slot),
            None => write!(f, "{}", self.address),
        }
    }
}

impl From<Address> for SlotKey {
    fn from(address: Address) -> Self {
        Self::single(address)
    }
}

impl From<&ContractRef> for SlotKey {
    fn from(contract: &ContractRef) -> Self {
        Self::single(contract.address())
    }
}

impl From<ContractRef> for SlotKey {
    fn from(contract: ContractRef) -> Self {
        Self::single(contract.address())
    }
}

impl From<(Address, SlotId)> for SlotKey {
    fn from((address, slot): (Address, SlotId)) -> Self {
        Self {
            address,
            slot: Some(slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes32_hex_roundtrip() {
        let value = Bytes32::from_bytes([0x42; 32]);
        let hex = value.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Bytes32::from_hex(&hex).unwrap(), value);
        assert_eq!(Bytes32::from_hex(&hex[2..]).unwrap(), value);
    }

    #[test]
    fn test_bytes32_rejects_wrong_length() {
        let err = Bytes32::from_hex("0xabcd").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidLength {
                expected: 32,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_bytes32_zero() {
        assert!(Bytes32::ZERO.is_zero());
        assert!(!Bytes32::from_bytes([1; 32]).is_zero());
    }

    #[test]
    fn test_address_parse() {
        let address: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        assert_eq!(address.as_bytes()[19], 0xaa);
        assert_eq!(address.to_string(), "0x00000000000000000000000000000000000000aa");
    }

    #[test]
    fn test_contract_ref_resolves_address() {
        let address = Address::from_bytes([7; 20]);
        let bare = ContractRef::from(address);
        let loaded = ContractRef::from(ContractHandle::new(address).with_label("DataContract"));
        assert_eq!(bare.address(), loaded.address());
        assert_eq!(SlotKey::from(&loaded), SlotKey::single(address));
    }

    #[test]
    fn test_slot_key_none_differs_from_null_name() {
        let address = Address::from_bytes([1; 20]);
        assert_ne!(SlotKey::single(address), SlotKey::multi(address, "null"));
    }

    #[test]
    fn test_bytes32_serde_as_hex_string() {
        let value = Bytes32::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, format!("\"{}\"", value.to_hex()));
        let back: Bytes32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}

//! Sharing contract surface.
//!
//! The contract stores one `bytes32` pointing at the serialized sharing graph,
//! plus a `bytes32 -> bytes32` mapping for named multi-sharing slots.

use serde_json::Value;

use keyweave_core::Bytes32;

use crate::error::{Result, StoreError};

/// Method names on the sharing contract.
pub mod methods {
    /// `sharing() -> bytes32`
    pub const SHARING: &str = "sharing";
    /// `setSharing(bytes32)`
    pub const SET_SHARING: &str = "setSharing";
    /// `multiSharings(bytes32 slot) -> bytes32`
    pub const MULTI_SHARINGS: &str = "multiSharings";
    /// `setMultiSharing(bytes32 slot, bytes32 hash)`
    pub const SET_MULTI_SHARING: &str = "setMultiSharing";
}

/// Encode a `bytes32` argument.
pub fn bytes32_arg(value: &Bytes32) -> Value {
    Value::String(value.to_hex())
}

/// Decode a `bytes32` return value or argument.
///
/// `null` and the empty string decode to [`Bytes32::ZERO`], matching how a
/// fresh contract slot reads.
pub fn parse_bytes32(value: &Value) -> Result<Bytes32> {
    match value {
        Value::Null => Ok(Bytes32::ZERO),
        Value::String(s) if s.is_empty() || s == "0x" => Ok(Bytes32::ZERO),
        Value::String(s) => Bytes32::from_hex(s)
            .map_err(|e| StoreError::InvalidArgument(format!("expected bytes32, got {s:?}: {e}"))),
        other => Err(StoreError::InvalidArgument(format!(
            "expected bytes32 string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_slot() {
        assert_eq!(parse_bytes32(&Value::Null).unwrap(), Bytes32::ZERO);
        assert_eq!(parse_bytes32(&Value::String("0x".into())).unwrap(), Bytes32::ZERO);
    }

    #[test]
    fn test_roundtrip() {
        let value = Bytes32::from_bytes([3; 32]);
        assert_eq!(parse_bytes32(&bytes32_arg(&value)).unwrap(), value);
    }

    #[test]
    fn test_rejects_numbers() {
        assert!(parse_bytes32(&Value::from(5)).is_err());
    }
}

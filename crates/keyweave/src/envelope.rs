//! The persisted unit of encrypted data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use keyweave_core::CryptoInfo;

/// Public data, private data, and the crypto info needed to read the private
/// part.
///
/// With `crypto_info` present, `private` is a hex string of ciphertext.
/// Without it, both parts are plaintext.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Data readable by anyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<Value>,
    /// Data readable by key holders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<Value>,
    /// How `private` was encrypted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_info: Option<CryptoInfo>,
}

impl Envelope {
    /// An envelope with only private data.
    pub fn private(value: impl Into<Value>) -> Self {
        Self {
            private: Some(value.into()),
            ..Self::default()
        }
    }

    /// Attach public data.
    pub fn with_public(mut self, value: impl Into<Value>) -> Self {
        self.public = Some(value.into());
        self
    }

    /// Whether the private part is ciphertext.
    pub fn is_encrypted(&self) -> bool {
        self.crypto_info.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyweave_core::Algorithm;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let envelope = Envelope {
            public: Some(json!({"title": "t"})),
            private: Some(json!("00ff")),
            crypto_info: Some(CryptoInfo::new(Algorithm::Content, "alice").with_block(100)),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "public": {"title": "t"},
                "private": "00ff",
                "cryptoInfo": {"algorithm": "aes-256-cbc", "originator": "alice", "block": 100},
            })
        );
    }

    #[test]
    fn test_absent_parts_omitted() {
        let envelope = Envelope::private("42");
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"private": "42"}));
        assert!(!envelope.is_encrypted());

        let parsed: Envelope = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Envelope::default());
    }
}

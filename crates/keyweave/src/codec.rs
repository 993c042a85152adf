//! Envelope codec: resolves keys through sharing and cryptors through the
//! registry.

use std::sync::Arc;

use serde_json::Value;

use keyweave_core::{AccountId, Algorithm, BlockKey, Bytes32, CryptoInfo, KeyMaterial, SlotKey};
use keyweave_crypto::{CryptoError, Cryptor, CryptorRegistry, FilePayload, Payload};
use keyweave_sharing::Sharing;

use crate::envelope::Envelope;
use crate::error::{KeyweaveError, Result};

/// Configuration for [`EnvelopeCodec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Algorithm used when `encrypt` is not given one.
    pub default_algorithm: Algorithm,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_algorithm: Algorithm::Content,
        }
    }
}

/// Encrypts and decrypts envelopes and on-chain hashes.
pub struct EnvelopeCodec {
    sharing: Arc<Sharing>,
    registry: CryptorRegistry,
    config: CodecConfig,
}

impl EnvelopeCodec {
    /// Create a codec.
    pub fn new(sharing: Arc<Sharing>, registry: CryptorRegistry, config: CodecConfig) -> Self {
        Self {
            sharing,
            registry,
            config,
        }
    }

    /// Codec using the sharing store's own registry and default config.
    pub fn from_sharing(sharing: Arc<Sharing>) -> Self {
        let registry = sharing.registry().clone();
        Self::new(sharing, registry, CodecConfig::default())
    }

    /// The sharing key store.
    pub fn sharing(&self) -> &Arc<Sharing> {
        &self.sharing
    }

    /// Encrypt the private part of `envelope` for `section` at `block`.
    ///
    /// The content key is whatever `account` can resolve at `block`. The
    /// public part is carried over unchanged. An envelope without private
    /// data is returned as is.
    pub async fn encrypt(
        &self,
        envelope: &Envelope,
        contract: impl Into<SlotKey>,
        account: &AccountId,
        section: &str,
        block: u64,
        algorithm: Option<Algorithm>,
    ) -> Result<Envelope> {
        let Some(private) = &envelope.private else {
            tracing::debug!(%account, section, "nothing private to encrypt");
            return Ok(envelope.clone());
        };

        let contract = contract.into();
        let algorithm = algorithm.unwrap_or(self.config.default_algorithm);
        let cryptor = self.registry.resolve(algorithm)?;
        let payload = to_payload(algorithm, private)?;

        let key = self
            .content_key(&contract, account, section, BlockKey::Block(block), algorithm)
            .await?;
        let ciphertext = cryptor.encrypt(&payload, key.as_ref()).await?;

        tracing::debug!(%contract, %account, section, block, %algorithm, "envelope encrypted");
        Ok(Envelope {
            public: envelope.public.clone(),
            private: Some(Value::String(hex::encode(ciphertext))),
            crypto_info: Some(cryptor.crypto_info(account.as_str()).with_block(block)),
        })
    }

    /// Decrypt the private part of `envelope`.
    ///
    /// Without crypto info the private part is returned unchanged (`null`
    /// when absent).
    pub async fn decrypt(
        &self,
        envelope: &Envelope,
        contract: impl Into<SlotKey>,
        account: &AccountId,
        section: &str,
    ) -> Result<Value> {
        let Some(info) = &envelope.crypto_info else {
            return Ok(envelope.private.clone().unwrap_or(Value::Null));
        };

        let contract = contract.into();
        let cryptor = self.registry.resolve_by_crypto_info(info)?;
        let ciphertext = ciphertext_bytes(envelope)?;

        let block = info.block.map(BlockKey::Block).unwrap_or(BlockKey::LATEST);
        let key = self
            .content_key(&contract, account, section, block, info.algorithm)
            .await?;
        let payload = cryptor.decrypt(&ciphertext, key.as_ref()).await?;
        from_payload(info, payload)
    }

    /// Decrypt and return the whole envelope in plaintext form.
    pub async fn decrypt_envelope(
        &self,
        envelope: &Envelope,
        contract: impl Into<SlotKey>,
        account: &AccountId,
        section: &str,
    ) -> Result<Envelope> {
        let private = self.decrypt(envelope, contract, account, section).await?;
        Ok(Envelope {
            public: envelope.public.clone(),
            private: Some(private),
            crypto_info: None,
        })
    }

    /// Encrypt an on-chain hash under the account's hash key.
    pub async fn encrypt_hash(
        &self,
        hash: &Bytes32,
        contract: impl Into<SlotKey>,
        account: &AccountId,
    ) -> Result<Bytes32> {
        let (cryptor, key) = self.hash_cryptor(contract.into(), account).await?;
        let out = cryptor
            .encrypt(&Payload::Data(hash.as_bytes().to_vec()), Some(&key))
            .await?;
        to_bytes32(&out)
    }

    /// Decrypt an on-chain hash under the account's hash key.
    pub async fn decrypt_hash(
        &self,
        encrypted: &Bytes32,
        contract: impl Into<SlotKey>,
        account: &AccountId,
    ) -> Result<Bytes32> {
        let (cryptor, key) = self.hash_cryptor(contract.into(), account).await?;
        let payload = cryptor.decrypt(encrypted.as_bytes(), Some(&key)).await?;
        let bytes = payload.into_data().ok_or_else(|| {
            KeyweaveError::InvalidEnvelope("hash cipher returned files".into())
        })?;
        to_bytes32(&bytes)
    }

    /// Generate a fresh content key for an algorithm.
    pub fn generate_content_key(&self, algorithm: Option<Algorithm>) -> Result<KeyMaterial> {
        let algorithm = algorithm.unwrap_or(self.config.default_algorithm);
        Ok(self.registry.resolve(algorithm)?.generate_key())
    }

    async fn content_key(
        &self,
        contract: &SlotKey,
        account: &AccountId,
        section: &str,
        block: BlockKey,
        algorithm: Algorithm,
    ) -> Result<Option<KeyMaterial>> {
        if algorithm == Algorithm::Unencrypted {
            return Ok(None);
        }
        let key = self
            .sharing
            .get_key(contract.clone(), account, section, block)
            .await?
            .ok_or_else(|| KeyweaveError::NoContentKey {
                contract: contract.clone(),
                account: account.clone(),
                section: section.to_owned(),
                block,
            })?;
        Ok(Some(key))
    }

    async fn hash_cryptor(
        &self,
        contract: SlotKey,
        account: &AccountId,
    ) -> Result<(Arc<dyn Cryptor>, KeyMaterial)> {
        let cryptor = self.registry.resolve(Algorithm::HashCipher)?;
        let key = self
            .sharing
            .get_hash_key(contract.clone(), account)
            .await?
            .ok_or_else(|| KeyweaveError::NoHashKey {
                contract,
                account: account.clone(),
            })?;
        Ok((cryptor, key))
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_payload(algorithm: Algorithm, private: &Value) -> Result<Payload> {
    match algorithm {
        Algorithm::Blob => serde_json::from_value::<FilePayload>(private.clone())
            .map(Payload::Files)
            .map_err(|e| KeyweaveError::InvalidEnvelope(format!("expected file payload: {e}"))),
        _ => serde_json::to_vec(private)
            .map(Payload::Data)
            .map_err(|e| KeyweaveError::Serialization(e.to_string())),
    }
}

fn from_payload(info: &CryptoInfo, payload: Payload) -> Result<Value> {
    match payload {
        Payload::Data(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            KeyweaveError::from(CryptoError::DecryptionFailed(format!(
                "{} plaintext is not JSON: {e}",
                info.algorithm
            )))
        }),
        Payload::Files(files) => {
            serde_json::to_value(files).map_err(|e| KeyweaveError::Serialization(e.to_string()))
        }
    }
}

fn ciphertext_bytes(envelope: &Envelope) -> Result<Vec<u8>> {
    match &envelope.private {
        Some(Value::String(s)) => {
            let raw = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(raw).map_err(|e| KeyweaveError::InvalidEnvelope(e.to_string()))
        }
        Some(other) => Err(KeyweaveError::InvalidEnvelope(format!(
            "encrypted private part must be a hex string, got {other}"
        ))),
        None => Err(KeyweaveError::InvalidEnvelope(
            "crypto info without private part".into(),
        )),
    }
}

fn to_bytes32(bytes: &[u8]) -> Result<Bytes32> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        KeyweaveError::InvalidEnvelope(format!("expected 32 bytes, got {}", bytes.len()))
    })?;
    Ok(Bytes32::from_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blob_payload_requires_files() {
        assert!(matches!(
            to_payload(Algorithm::Blob, &json!("text")),
            Err(KeyweaveError::InvalidEnvelope(_))
        ));
        let files = json!({"name": "a", "fileType": "t", "file": "00"});
        assert!(matches!(
            to_payload(Algorithm::Blob, &files),
            Ok(Payload::Files(FilePayload::Single(_)))
        ));
    }

    #[test]
    fn test_data_payload_is_json() {
        let payload = to_payload(Algorithm::Content, &json!({"a": 1})).unwrap();
        assert_eq!(payload, Payload::Data(br#"{"a":1}"#.to_vec()));
    }

    #[test]
    fn test_ciphertext_must_be_hex_string() {
        let envelope = Envelope {
            private: Some(json!(5)),
            ..Envelope::default()
        };
        assert!(ciphertext_bytes(&envelope).is_err());

        let envelope = Envelope::private("0x00ff");
        assert_eq!(ciphertext_bytes(&envelope).unwrap(), vec![0x00, 0xff]);
    }
}

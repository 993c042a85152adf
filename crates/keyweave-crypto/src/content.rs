//! AES-256-CBC content cryptor.
//!
//! Ciphertext layout is `[16-byte IV][ciphertext]` with PKCS#7 padding. A
//! fresh IV is drawn for every call.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use async_trait::async_trait;
use rand::RngCore;

use keyweave_core::{Algorithm, KeyMaterial};

use crate::cryptor::{require_data, require_key, Cryptor};
use crate::error::{CryptoError, Result};
use crate::payload::Payload;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the CBC initialization vector.
pub const IV_LENGTH: usize = 16;

/// Encrypt `plaintext` under `key` with a fresh IV, returning `IV || ciphertext`.
pub fn cbc_encrypt(key: &KeyMaterial, plaintext: &[u8]) -> Vec<u8> {
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);
    cbc_encrypt_with_iv(key, &iv, plaintext)
}

/// Encrypt with an explicit IV. Deterministic for identical inputs.
pub fn cbc_encrypt_with_iv(key: &KeyMaterial, iv: &[u8; IV_LENGTH], plaintext: &[u8]) -> Vec<u8> {
    let key_bytes = *key.as_bytes();
    let ciphertext = Aes256CbcEnc::new(&key_bytes.into(), &(*iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_LENGTH + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt `IV || ciphertext` under `key`.
pub fn cbc_decrypt(key: &KeyMaterial, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < IV_LENGTH {
        return Err(CryptoError::DecryptionFailed(format!(
            "ciphertext of {} bytes is shorter than the IV",
            data.len()
        )));
    }
    let (iv, ciphertext) = data.split_at(IV_LENGTH);
    let iv: [u8; IV_LENGTH] = iv
        .try_into()
        .map_err(|_| CryptoError::DecryptionFailed("malformed IV".into()))?;

    let key_bytes = *key.as_bytes();
    Aes256CbcDec::new(&key_bytes.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Byte-buffer cryptor using AES-256-CBC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCryptor;

impl ContentCryptor {
    /// Create a content cryptor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cryptor for ContentCryptor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Content
    }

    async fn encrypt(&self, payload: &Payload, key: Option<&KeyMaterial>) -> Result<Vec<u8>> {
        let key = require_key(self.algorithm(), key)?;
        let data = require_data(self.algorithm(), payload)?;
        Ok(cbc_encrypt(key, data))
    }

    async fn decrypt(&self, ciphertext: &[u8], key: Option<&KeyMaterial>) -> Result<Payload> {
        let key = require_key(self.algorithm(), key)?;
        cbc_decrypt(key, ciphertext).map(Payload::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{FileDescriptor, FilePayload};
    use keyweave_core::KEY_LENGTH_BITS;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let cryptor = ContentCryptor::new();
        let key = cryptor.generate_key();
        let payload = Payload::Data(b"42".to_vec());

        let ciphertext = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_eq!(ciphertext.len(), IV_LENGTH + 16);

        let decrypted = cryptor.decrypt(&ciphertext, Some(&key)).await.unwrap();
        assert_eq!(decrypted, payload);
    }

    #[tokio::test]
    async fn test_fresh_iv_per_call() {
        let cryptor = ContentCryptor::new();
        let key = cryptor.generate_key();
        let payload = Payload::Data(b"same plaintext".to_vec());

        let a = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        let b = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(cryptor.decrypt(&a, Some(&key)).await.unwrap(), payload);
        assert_eq!(cryptor.decrypt(&b, Some(&key)).await.unwrap(), payload);
    }

    #[test]
    fn test_deterministic_with_fixed_iv() {
        let key = KeyMaterial::from_bytes([7; 32]);
        let iv = [3u8; IV_LENGTH];
        assert_eq!(
            cbc_encrypt_with_iv(&key, &iv, b"abc"),
            cbc_encrypt_with_iv(&key, &iv, b"abc")
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cryptor = ContentCryptor::new();
        let result = cryptor.encrypt(&Payload::Data(vec![1]), None).await;
        assert!(matches!(result, Err(CryptoError::MissingKey(Algorithm::Content))));

        let result = cryptor.decrypt(&[0u8; 32], None).await;
        assert!(matches!(result, Err(CryptoError::MissingKey(Algorithm::Content))));
    }

    #[tokio::test]
    async fn test_truncated_ciphertext_fails() {
        let cryptor = ContentCryptor::new();
        let key = cryptor.generate_key();
        let result = cryptor.decrypt(&[1, 2, 3], Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));

        // IV plus a partial block
        let result = cryptor.decrypt(&[0u8; IV_LENGTH + 5], Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[tokio::test]
    async fn test_wrong_key_never_yields_plaintext() {
        let cryptor = ContentCryptor::new();
        let payload = Payload::Data(b"secret balance".to_vec());
        let ciphertext = cryptor
            .encrypt(&payload, Some(&KeyMaterial::generate()))
            .await
            .unwrap();

        match cryptor.decrypt(&ciphertext, Some(&KeyMaterial::generate())).await {
            Err(CryptoError::DecryptionFailed(_)) => {}
            Ok(other) => assert_ne!(other, payload),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_files() {
        let cryptor = ContentCryptor::new();
        let key = cryptor.generate_key();
        let files = Payload::Files(FilePayload::Single(FileDescriptor::new("a", "t", vec![])));
        let result = cryptor.encrypt(&files, Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::UnsupportedPayload { .. })));
    }

    #[test]
    fn test_crypto_info() {
        let info = ContentCryptor::new().crypto_info("0xabc");
        assert_eq!(info.algorithm, Algorithm::Content);
        assert_eq!(info.originator, "0xabc");
        assert_eq!(info.key_length, Some(KEY_LENGTH_BITS));
        assert_eq!(info.block, None);
    }

    proptest! {
        #[test]
        fn prop_cbc_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512), seed in any::<[u8; 32]>()) {
            let key = KeyMaterial::from_bytes(seed);
            let ciphertext = cbc_encrypt(&key, &data);
            prop_assert_eq!(ciphertext.len() % 16, 0);
            prop_assert_eq!(cbc_decrypt(&key, &ciphertext).unwrap(), data);
        }
    }
}

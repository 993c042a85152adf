//! Identity cryptor.

use async_trait::async_trait;

use keyweave_core::{Algorithm, CryptoInfo, KeyMaterial};

use crate::cryptor::{require_data, Cryptor};
use crate::error::Result;
use crate::payload::Payload;

/// Passes data through unchanged. Accepts and ignores any key.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnencryptedCryptor;

impl UnencryptedCryptor {
    /// Create an identity cryptor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cryptor for UnencryptedCryptor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Unencrypted
    }

    fn crypto_info(&self, originator: &str) -> CryptoInfo {
        CryptoInfo::new(self.algorithm(), originator)
    }

    async fn encrypt(&self, payload: &Payload, _key: Option<&KeyMaterial>) -> Result<Vec<u8>> {
        require_data(self.algorithm(), payload).map(<[u8]>::to_vec)
    }

    async fn decrypt(&self, ciphertext: &[u8], _key: Option<&KeyMaterial>) -> Result<Payload> {
        Ok(Payload::Data(ciphertext.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_without_key() {
        let cryptor = UnencryptedCryptor::new();
        let payload = Payload::Data(b"{\"a\":1}".to_vec());
        let out = cryptor.encrypt(&payload, None).await.unwrap();
        assert_eq!(out, b"{\"a\":1}");
        assert_eq!(cryptor.decrypt(&out, None).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_key_is_ignored() {
        let cryptor = UnencryptedCryptor::new();
        let key = KeyMaterial::generate();
        let payload = Payload::Data(vec![1, 2, 3]);
        let out = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_crypto_info_has_no_key_length() {
        let info = UnencryptedCryptor::new().crypto_info("me");
        assert_eq!(info.algorithm, Algorithm::Unencrypted);
        assert_eq!(info.key_length, None);
    }
}

//! File cryptor that offloads file bodies to the blob store.
//!
//! Each file body is encrypted on its own (IV-prefixed AES-256-CBC) and
//! uploaded. The descriptor list, with bodies replaced by blob hashes, is then
//! encrypted under the same key with a fresh IV and returned.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use keyweave_core::{Algorithm, Bytes32, KeyMaterial};
use keyweave_store::BlobStore;

use crate::content::{cbc_decrypt, cbc_encrypt};
use crate::cryptor::{require_key, Cryptor};
use crate::error::{CryptoError, Result};
use crate::payload::{FileDescriptor, FilePayload, Payload};

/// Default number of concurrent blob-store requests.
pub const DEFAULT_FAN_OUT: usize = 10;

/// A file descriptor whose body lives in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFile {
    name: String,
    file_type: String,
    file: Bytes32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredFiles {
    Single(StoredFile),
    Multiple(Vec<StoredFile>),
}

impl StoredFiles {
    fn files(&self) -> &[StoredFile] {
        match self {
            StoredFiles::Single(file) => std::slice::from_ref(file),
            StoredFiles::Multiple(files) => files,
        }
    }
}

/// Cryptor for file payloads.
pub struct BlobCryptor {
    blobs: Arc<dyn BlobStore>,
    fan_out: usize,
}

impl BlobCryptor {
    /// Create a blob cryptor over a blob store.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Limit concurrent uploads and fetches.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Maximum concurrent blob-store requests.
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    async fn upload(&self, key: &KeyMaterial, files: &[FileDescriptor]) -> Result<Vec<Bytes32>> {
        let blobs = self.blobs.as_ref();
        let uploads: Vec<_> = files
            .iter()
            .map(|file| {
                let body = Bytes::from(cbc_encrypt(key, &file.file));
                let name = file.name.clone();
                async move { blobs.add(&name, body).await }
            })
            .collect();

        let hashes: Vec<Bytes32> = stream::iter(uploads)
            .buffered(self.fan_out)
            .try_collect()
            .await?;
        tracing::debug!(files = hashes.len(), "uploaded encrypted file bodies");
        Ok(hashes)
    }

    async fn fetch(&self, key: &KeyMaterial, files: &[StoredFile]) -> Result<Vec<FileDescriptor>> {
        let blobs = self.blobs.as_ref();
        let fetches: Vec<_> = files
            .iter()
            .map(|stored| async move {
                let body = blobs.get(&stored.file).await?;
                let file = cbc_decrypt(key, &body)?;
                Ok::<_, CryptoError>(FileDescriptor {
                    name: stored.name.clone(),
                    file_type: stored.file_type.clone(),
                    file,
                })
            })
            .collect();

        stream::iter(fetches).buffered(self.fan_out).try_collect().await
    }
}

impl std::fmt::Debug for BlobCryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobCryptor")
            .field("fan_out", &self.fan_out)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cryptor for BlobCryptor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Blob
    }

    async fn encrypt(&self, payload: &Payload, key: Option<&KeyMaterial>) -> Result<Vec<u8>> {
        let key = require_key(self.algorithm(), key)?;
        let Payload::Files(files) = payload else {
            return Err(CryptoError::UnsupportedPayload {
                algorithm: self.algorithm(),
                kind: payload.kind(),
            });
        };

        let hashes = self.upload(key, files.files()).await?;
        let stored: Vec<StoredFile> = files
            .files()
            .iter()
            .zip(hashes)
            .map(|(file, hash)| StoredFile {
                name: file.name.clone(),
                file_type: file.file_type.clone(),
                file: hash,
            })
            .collect();

        let wrapper = match files {
            FilePayload::Single(_) => stored
                .into_iter()
                .next()
                .map(StoredFiles::Single)
                .ok_or_else(|| CryptoError::EncryptionFailed("single file was not stored".into()))?,
            FilePayload::Multiple(_) => StoredFiles::Multiple(stored),
        };

        let json =
            serde_json::to_vec(&wrapper).map_err(|e| CryptoError::Serialization(e.to_string()))?;
        Ok(cbc_encrypt(key, &json))
    }

    async fn decrypt(&self, ciphertext: &[u8], key: Option<&KeyMaterial>) -> Result<Payload> {
        let key = require_key(self.algorithm(), key)?;
        let json = cbc_decrypt(key, ciphertext)?;
        let wrapper: StoredFiles = serde_json::from_slice(&json)
            .map_err(|e| CryptoError::DecryptionFailed(format!("malformed file wrapper: {e}")))?;

        let mut files = self.fetch(key, wrapper.files()).await?;
        let payload = match wrapper {
            StoredFiles::Single(_) => files
                .pop()
                .map(FilePayload::Single)
                .ok_or_else(|| CryptoError::DecryptionFailed("single file missing".into()))?,
            StoredFiles::Multiple(_) => FilePayload::Multiple(files),
        };
        Ok(Payload::Files(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyweave_store::MemoryBlobStore;

    fn files(n: usize) -> Vec<FileDescriptor> {
        (0..n)
            .map(|i| FileDescriptor::new(format!("file-{i}"), "application/octet-stream", vec![i as u8; 100 + i]))
            .collect()
    }

    #[tokio::test]
    async fn test_single_file_roundtrip() {
        let store = Arc::new(MemoryBlobStore::new());
        let cryptor = BlobCryptor::new(store.clone());
        let key = cryptor.generate_key();
        let payload = Payload::Files(FilePayload::Single(files(1).remove(0)));

        let ciphertext = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_eq!(store.upload_count(), 1);

        let decrypted = cryptor.decrypt(&ciphertext, Some(&key)).await.unwrap();
        assert_eq!(decrypted, payload);
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_many_files_keep_order() {
        let store = Arc::new(MemoryBlobStore::new());
        let cryptor = BlobCryptor::new(store.clone()).with_fan_out(3);
        let key = cryptor.generate_key();
        let payload = Payload::Files(FilePayload::Multiple(files(25)));

        let ciphertext = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_eq!(store.upload_count(), 25);
        assert_eq!(cryptor.decrypt(&ciphertext, Some(&key)).await.unwrap(), payload);
    }

    #[test]
    fn test_fan_out_is_at_least_one() {
        let store = Arc::new(MemoryBlobStore::new());
        assert_eq!(BlobCryptor::new(store.clone()).fan_out(), DEFAULT_FAN_OUT);
        assert_eq!(BlobCryptor::new(store.clone()).with_fan_out(4).fan_out(), 4);
        assert_eq!(BlobCryptor::new(store).with_fan_out(0).fan_out(), 1);
    }

    #[tokio::test]
    async fn test_stored_bodies_are_ciphertext() {
        let store = Arc::new(MemoryBlobStore::new());
        let cryptor = BlobCryptor::new(store.clone());
        let key = cryptor.generate_key();
        let file = FileDescriptor::new("plain.txt", "text/plain", b"plaintext body".to_vec());
        cryptor
            .encrypt(&Payload::Files(FilePayload::Single(file)), Some(&key))
            .await
            .unwrap();

        // Content addressing over the raw body would hit this hash.
        let plain_hash = Bytes32(*blake3::hash(b"plaintext body").as_bytes());
        assert!(store.get(&plain_hash).await.is_err());
    }

    #[tokio::test]
    async fn test_fresh_iv_per_call() {
        let store = Arc::new(MemoryBlobStore::new());
        let cryptor = BlobCryptor::new(store);
        let key = cryptor.generate_key();
        let payload = Payload::Files(FilePayload::Multiple(files(2)));

        let a = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        let b = cryptor.encrypt(&payload, Some(&key)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(cryptor.decrypt(&a, Some(&key)).await.unwrap(), payload);
        assert_eq!(cryptor.decrypt(&b, Some(&key)).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_rejects_data_and_missing_key() {
        let cryptor = BlobCryptor::new(Arc::new(MemoryBlobStore::new()));
        let key = cryptor.generate_key();

        let result = cryptor.encrypt(&Payload::Data(vec![1]), Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::UnsupportedPayload { .. })));

        let payload = Payload::Files(FilePayload::Multiple(files(1)));
        let result = cryptor.encrypt(&payload, None).await;
        assert!(matches!(result, Err(CryptoError::MissingKey(Algorithm::Blob))));
    }

    #[tokio::test]
    async fn test_missing_blob_propagates_store_error() {
        let store = Arc::new(MemoryBlobStore::new());
        let cryptor = BlobCryptor::new(store);
        let key = cryptor.generate_key();

        let wrapper = StoredFiles::Single(StoredFile {
            name: "gone".into(),
            file_type: "t".into(),
            file: Bytes32::from_bytes([4; 32]),
        });
        let ciphertext = cbc_encrypt(&key, &serde_json::to_vec(&wrapper).unwrap());

        let result = cryptor.decrypt(&ciphertext, Some(&key)).await;
        assert!(matches!(result, Err(CryptoError::Store(_))));
    }
}

//! Plaintext payloads accepted by cryptors.

use serde::{Deserialize, Serialize};

/// What a cryptor encrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// An opaque byte buffer.
    Data(Vec<u8>),
    /// One or more file descriptors.
    Files(FilePayload),
}

impl Payload {
    /// Short name of the variant, used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Data(_) => "data",
            Payload::Files(_) => "files",
        }
    }

    /// Borrow the byte buffer, if this is a data payload.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Payload::Data(data) => Some(data),
            Payload::Files(_) => None,
        }
    }

    /// Take the byte buffer, if this is a data payload.
    pub fn into_data(self) -> Option<Vec<u8>> {
        match self {
            Payload::Data(data) => Some(data),
            Payload::Files(_) => None,
        }
    }

    /// Take the files, if this is a file payload.
    pub fn into_files(self) -> Option<FilePayload> {
        match self {
            Payload::Files(files) => Some(files),
            Payload::Data(_) => None,
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Data(data)
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Payload::Data(data.to_vec())
    }
}

impl From<FilePayload> for Payload {
    fn from(files: FilePayload) -> Self {
        Payload::Files(files)
    }
}

/// A single file, or a list of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilePayload {
    /// One file.
    Single(FileDescriptor),
    /// Several files, in order.
    Multiple(Vec<FileDescriptor>),
}

impl FilePayload {
    /// Borrow the files as a slice.
    pub fn files(&self) -> &[FileDescriptor] {
        match self {
            FilePayload::Single(file) => std::slice::from_ref(file),
            FilePayload::Multiple(files) => files,
        }
    }
}

/// A named file with its raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// File name.
    pub name: String,
    /// MIME type or similar.
    pub file_type: String,
    /// Raw file body, hex on the wire.
    #[serde(with = "hex_bytes")]
    pub file: Vec<u8>,
}

impl FileDescriptor {
    /// Create a file descriptor.
    pub fn new(name: impl Into<String>, file_type: impl Into<String>, file: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_type: file_type.into(),
            file,
        }
    }
}

/// Serde adapter for byte buffers as lowercase hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as hex.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Deserialize bytes from hex, with or without `0x` prefix.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_wire_format() {
        let file = FileDescriptor::new("a.txt", "text/plain", b"hi".to_vec());
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "a.txt", "fileType": "text/plain", "file": "6869"})
        );
    }

    #[test]
    fn test_single_and_multiple_are_distinguished() {
        let one = FilePayload::Single(FileDescriptor::new("a", "t", vec![1]));
        let many = FilePayload::Multiple(vec![FileDescriptor::new("a", "t", vec![1])]);

        let one_back: FilePayload =
            serde_json::from_str(&serde_json::to_string(&one).unwrap()).unwrap();
        let many_back: FilePayload =
            serde_json::from_str(&serde_json::to_string(&many).unwrap()).unwrap();

        assert_eq!(one_back, one);
        assert_eq!(many_back, many);
        assert_eq!(one.files().len(), 1);
    }
}

//! Sharing key store configuration.

use keyweave_crypto::DEFAULT_FAN_OUT;

/// Configuration for [`Sharing`](crate::Sharing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingConfig {
    /// Keep loaded graphs and unwrapped keys in memory.
    pub cache_enabled: bool,
    /// Maximum concurrent unwraps in bulk operations.
    pub fan_out: usize,
    /// Name recorded with uploaded sharing blobs.
    pub blob_name: String,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            fan_out: DEFAULT_FAN_OUT,
            blob_name: "sharing".into(),
        }
    }
}

impl SharingConfig {
    /// Configuration with caching switched off.
    pub fn uncached() -> Self {
        Self {
            cache_enabled: false,
            ..Self::default()
        }
    }
}

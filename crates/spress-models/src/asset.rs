//! Asset descriptors.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A local media file handed off by the boundary layer.
///
/// Owned exclusively by one pipeline invocation; the file is deleted
/// unconditionally when that invocation ends, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Path to the staged input file
    pub local_path: PathBuf,
    /// Mime type as declared by the transport (untrusted)
    pub declared_mime: Option<String>,
    /// Original filename as declared by the transport (untrusted)
    pub declared_file_name: Option<String>,
    /// Input size in bytes
    pub size_bytes: u64,
}

impl MediaAsset {
    pub fn new(local_path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            local_path: local_path.into(),
            declared_mime: None,
            declared_file_name: None,
            size_bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.declared_file_name = Some(name.into());
        self
    }
}

/// A provider-hosted asset resolved from a share link.
///
/// Consumed once to materialize a [`MediaAsset`], then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAsset {
    /// Stable numeric identifier at the provider
    pub provider_id: String,
    /// URL of the selected media variant
    pub source_url: String,
    /// Human-readable content description
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_asset_builder() {
        let asset = MediaAsset::new("/tmp/in.gif", 1024)
            .with_mime("image/gif")
            .with_file_name("funny.gif");

        assert_eq!(asset.local_path, PathBuf::from("/tmp/in.gif"));
        assert_eq!(asset.declared_mime.as_deref(), Some("image/gif"));
        assert_eq!(asset.declared_file_name.as_deref(), Some("funny.gif"));
        assert_eq!(asset.size_bytes, 1024);
    }
}

//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for per-invocation staging directories
    pub staging_root: PathBuf,
    /// Tenor API key
    pub tenor_api_key: String,
    /// Timeout for remote metadata and asset fetches
    pub fetch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_root: PathBuf::from("/tmp/stickerpress"),
            tenor_api_key: String::new(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            staging_root: std::env::var("STICKERPRESS_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/stickerpress")),
            tenor_api_key: std::env::var("TENOR_API_KEY").unwrap_or_default(),
            fetch_timeout: Duration::from_secs(
                std::env::var("STICKERPRESS_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

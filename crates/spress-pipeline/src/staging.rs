//! Per-invocation staging directories.
//!
//! Every conversion gets a fresh directory under the configured staging
//! root. The directory and its contents are removed when the handle
//! drops, on success and on every failure path alike.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::error::PipelineResult;

/// A temporary working directory for one conversion.
#[derive(Debug)]
pub struct StagingArea {
    dir: tempfile::TempDir,
}

impl StagingArea {
    /// Create a fresh staging directory under `root`, creating the root
    /// if necessary.
    pub async fn create(root: &Path) -> PipelineResult<Self> {
        tokio::fs::create_dir_all(root).await?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let prefix = format!("{}-{}-", millis, Uuid::new_v4().simple());

        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file inside the staging directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

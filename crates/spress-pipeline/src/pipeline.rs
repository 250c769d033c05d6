//! End-to-end conversion flows.
//!
//! Two entry points: `convert_upload` takes a staged local file, routes
//! it to the static or video engine by classification, and always
//! deletes the input afterwards. `convert_link` resolves a Tenor share
//! link, downloads the GIF, and runs it through the video engine.
//! Both stage intermediate artifacts in a per-invocation directory that
//! is removed on every exit path.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use spress_media::{conform_image, move_file, transcode_to_webm, MediaError};
use spress_models::{classify, MediaAsset, StickerPolicy};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::staging::StagingArea;
use crate::tenor::TenorClient;

/// The sticker conversion pipeline.
#[derive(Debug, Clone)]
pub struct StickerPipeline {
    policy: StickerPolicy,
    staging_root: PathBuf,
    tenor: TenorClient,
}

impl StickerPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            policy: StickerPolicy::default(),
            staging_root: config.staging_root.clone(),
            tenor: TenorClient::new(config),
        }
    }

    /// Replace the default policy. Tests tighten limits through this.
    pub fn with_policy(mut self, policy: StickerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the Tenor client, e.g. to point it at a mock endpoint.
    pub fn with_tenor_client(mut self, tenor: TenorClient) -> Self {
        self.tenor = tenor;
        self
    }

    pub fn policy(&self) -> &StickerPolicy {
        &self.policy
    }

    /// Convert a local upload into a conformant sticker at `output`.
    ///
    /// The input file is deleted unconditionally when this returns,
    /// success or failure.
    pub async fn convert_upload(&self, asset: MediaAsset, output: &Path) -> PipelineResult<()> {
        let result = self.run_upload(&asset, output).await;

        if let Err(err) = tokio::fs::remove_file(&asset.local_path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %asset.local_path.display(),
                    error = %err,
                    "failed to delete consumed input"
                );
            }
        }

        result
    }

    async fn run_upload(&self, asset: &MediaAsset, output: &Path) -> PipelineResult<()> {
        let classification = classify(
            asset.declared_mime.as_deref(),
            asset.declared_file_name.as_deref(),
        );

        if !classification.supported {
            let declared = asset
                .declared_mime
                .clone()
                .or_else(|| asset.declared_file_name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(PipelineError::Media(MediaError::UnsupportedFormat(
                declared,
            )));
        }

        if asset.size_bytes > self.policy.max_input_bytes {
            return Err(PipelineError::Media(MediaError::Oversize {
                actual: asset.size_bytes,
                limit: self.policy.max_input_bytes,
            }));
        }

        let staging = StagingArea::create(&self.staging_root).await?;

        if classification.is_static_image {
            let staged = staging.file("sticker.png");
            conform_image(&asset.local_path, &staged, &self.policy).await?;
            move_file(&staged, output).await?;
            info!(output = %output.display(), "static sticker produced");
        } else {
            let staged = staging.file("sticker.webm");
            transcode_to_webm(&asset.local_path, &staged, &self.policy).await?;
            move_file(&staged, output).await?;
            info!(output = %output.display(), "animated sticker produced");
        }

        Ok(())
    }

    /// Convert a Tenor share link into an animated sticker at `output`.
    pub async fn convert_link(&self, share_url: &str, output: &Path) -> PipelineResult<()> {
        let remote = self.tenor.resolve(share_url).await?;

        let staging = StagingArea::create(&self.staging_root).await?;
        let downloaded = staging.file(&format!("tenor_{}.gif", remote.provider_id));

        self.tenor
            .fetch(&remote, &downloaded, self.policy.max_input_bytes)
            .await?;

        let staged = staging.file("sticker.webm");
        transcode_to_webm(&downloaded, &staged, &self.policy).await?;
        move_file(&staged, output).await?;

        info!(
            id = %remote.provider_id,
            title = %remote.title,
            output = %output.display(),
            "tenor sticker produced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn test_config(root: &Path) -> PipelineConfig {
        PipelineConfig {
            staging_root: root.to_path_buf(),
            ..PipelineConfig::default()
        }
    }

    fn write_png(path: &Path, width: u32, height: u32) -> u64 {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        img.save(path).unwrap();
        std::fs::metadata(path).unwrap().len()
    }

    #[tokio::test]
    async fn test_static_upload_produces_sticker_and_deletes_input() {
        let dir = tempfile::tempdir().unwrap();
        let staging_root = dir.path().join("staging");
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");

        let size = write_png(&input, 100, 60);
        let asset = MediaAsset::new(&input, size)
            .with_mime("image/png")
            .with_file_name("in.png");

        let pipeline = StickerPipeline::new(&test_config(&staging_root));
        pipeline.convert_upload(asset, &output).await.unwrap();

        assert!(output.exists());
        assert!(!input.exists(), "consumed input must be deleted");
    }

    #[tokio::test]
    async fn test_staging_root_empty_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let staging_root = dir.path().join("staging");
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");

        let size = write_png(&input, 64, 64);
        let asset = MediaAsset::new(&input, size).with_mime("image/png");

        let pipeline = StickerPipeline::new(&test_config(&staging_root));
        pipeline.convert_upload(asset, &output).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&staging_root)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(leftovers.is_empty(), "staging dir must be cleaned up");
    }

    #[tokio::test]
    async fn test_unsupported_input_rejected_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let staging_root = dir.path().join("staging");
        let input = dir.path().join("note.txt");
        std::fs::write(&input, b"not media").unwrap();

        let asset = MediaAsset::new(&input, 9)
            .with_mime("text/plain")
            .with_file_name("note.txt");

        let pipeline = StickerPipeline::new(&test_config(&staging_root));
        let err = pipeline
            .convert_upload(asset, &dir.path().join("out.png"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "unsupported_format");
        assert!(!input.exists(), "input deleted even on rejection");
    }

    #[tokio::test]
    async fn test_oversize_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let staging_root = dir.path().join("staging");
        let input = dir.path().join("in.png");
        write_png(&input, 32, 32);

        let policy = StickerPolicy {
            max_input_bytes: 10,
            ..StickerPolicy::default()
        };
        let asset = MediaAsset::new(&input, 11).with_mime("image/png");

        let pipeline = StickerPipeline::new(&test_config(&staging_root)).with_policy(policy);
        let err = pipeline
            .convert_upload(asset, &dir.path().join("out.png"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "oversize");
    }

    #[tokio::test]
    async fn test_staging_root_empty_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let staging_root = dir.path().join("staging");

        // The engine fails after the staging area exists: the input
        // classifies as static but is not decodable media.
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not a png").unwrap();
        let asset = MediaAsset::new(&input, 9).with_mime("image/png");

        let pipeline = StickerPipeline::new(&test_config(&staging_root));
        let result = pipeline
            .convert_upload(asset, &dir.path().join("out.png"))
            .await;

        assert!(result.is_err());
        let leftovers: Vec<_> = std::fs::read_dir(&staging_root)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(leftovers.is_empty(), "staging dir cleaned up on failure");
    }

    #[tokio::test]
    async fn test_bad_tenor_link_fails_before_any_network_io() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = StickerPipeline::new(&test_config(dir.path()));

        let err = pipeline
            .convert_link("https://example.com/nope", &dir.path().join("out.webm"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "invalid_link");
    }
}

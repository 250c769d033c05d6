//! Three-tier VP9 transcode engine for animated stickers.
//!
//! Probes the input, resolves its true duration, then walks a bounded
//! escalation ladder: each tier re-encodes at a tighter size budget and
//! coarser quality until the artifact fits the ceiling. The final tier's
//! result is accepted regardless of measured size; there is never a
//! fourth attempt. Each tier writes a fresh artifact and the superseded
//! one is deleted, so at most one output ever remains on disk.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use spress_models::{
    EncodeParameters, EncodeTier, StickerPolicy, PIXEL_FORMAT, QUALITY_PRESET, VIDEO_CODEC,
};

use crate::bitrate::plan_bitrate;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::duration::resolve_duration;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::probe::probe_media;

/// Transcode an input to a conformant animated sticker (WEBM/VP9/alpha).
///
/// The final output only materializes at `output` after the escalation
/// loop settles on an artifact; no partially written file ever carries
/// the final name.
pub async fn transcode_to_webm(
    input: &Path,
    output: &Path,
    policy: &StickerPolicy,
) -> MediaResult<()> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    let summary = probe_media(input).await?;
    let resolved = resolve_duration(input, &summary).await;

    let effective = resolved.min(policy.max_output_duration_secs);
    let should_trim = resolved > policy.max_output_duration_secs;

    info!(
        "Transcoding {} -> {} (duration {:.2}s, effective {:.2}s, trim: {})",
        input.display(),
        output.display(),
        resolved,
        effective,
        should_trim
    );

    let artifact = run_escalation(input, output, effective, should_trim, policy).await?;

    if let Err(e) = move_file(&artifact, output).await {
        let _ = fs::remove_file(&artifact).await;
        return Err(e);
    }

    Ok(())
}

/// Walk the escalation ladder, returning the accepted artifact path.
///
/// Invariant on exit, success or failure: at most one tier artifact
/// exists on disk (the returned one), and none on error.
async fn run_escalation(
    input: &Path,
    output: &Path,
    effective_duration: f64,
    should_trim: bool,
    policy: &StickerPolicy,
) -> MediaResult<PathBuf> {
    let mut current: Option<PathBuf> = None;

    for tier in EncodeTier::ALL {
        let params = tier_parameters(tier, effective_duration, should_trim, policy);
        let candidate = tier_artifact_path(output, tier);

        debug!(
            "Tier {}: {} kbit/s, crf {}, speed {}",
            tier, params.bitrate_kbps, params.crf, params.speed
        );

        if let Err(e) = encode_tier(input, &candidate, &params, policy).await {
            // A hard encoder failure aborts; tiers only escalate on size.
            let _ = fs::remove_file(&candidate).await;
            if let Some(prev) = current {
                let _ = fs::remove_file(&prev).await;
            }
            return Err(e);
        }

        if let Some(prev) = current.replace(candidate.clone()) {
            let _ = fs::remove_file(&prev).await;
        }

        let size = fs::metadata(&candidate).await?.len();
        if size <= policy.max_output_bytes {
            info!("Tier {} output fits: {} bytes", tier, size);
            break;
        }

        if tier.is_final() {
            // Bounded effort: accept the floor-tier result as-is.
            warn!(
                "Floor tier still over budget ({} > {} bytes), accepting result",
                size, policy.max_output_bytes
            );
        } else {
            info!(
                "Tier {} over budget ({} > {} bytes), escalating",
                tier, size, policy.max_output_bytes
            );
        }
    }

    current.ok_or_else(|| MediaError::internal("escalation loop produced no artifact"))
}

/// Compute fresh encoder parameters for one tier.
fn tier_parameters(
    tier: EncodeTier,
    effective_duration: f64,
    should_trim: bool,
    policy: &StickerPolicy,
) -> EncodeParameters {
    EncodeParameters {
        bitrate_kbps: plan_bitrate(tier.size_budget_kib(), effective_duration),
        crf: tier.crf(),
        speed: tier.speed(),
        trim_to_secs: should_trim.then_some(policy.max_output_duration_secs),
    }
}

/// Run one encoder invocation with the declared parameter set.
async fn encode_tier(
    input: &Path,
    candidate: &Path,
    params: &EncodeParameters,
    policy: &StickerPolicy,
) -> MediaResult<()> {
    let mut cmd = FfmpegCommand::new(input, candidate)
        .video_codec(VIDEO_CODEC)
        .pixel_format(PIXEL_FORMAT)
        .video_filter(square_pad_filter(policy.output_side))
        .no_audio();

    if let Some(secs) = params.trim_to_secs {
        cmd = cmd.duration(secs);
    }

    let cmd = cmd
        .bitrate_kbps(params.bitrate_kbps)
        .crf(params.crf)
        .quality(QUALITY_PRESET)
        .speed(params.speed)
        .disable_alt_ref()
        .loop_forever();

    FfmpegRunner::new().run(&cmd).await
}

/// Aspect-preserving scale onto a transparent square canvas.
fn square_pad_filter(side: u32) -> String {
    format!(
        "scale={side}:{side}:force_original_aspect_ratio=decrease,\
         pad={side}:{side}:(ow-iw)/2:(oh-ih)/2:color=0x00000000"
    )
}

/// Sibling path for one tier's artifact, distinct per tier so a failed
/// rename can never alias the previous result.
fn tier_artifact_path(output: &Path, tier: EncodeTier) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sticker".to_string());
    output.with_file_name(format!("{stem}.{tier}.webm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StickerPolicy {
        StickerPolicy::default()
    }

    #[test]
    fn test_trim_only_when_over_ceiling() {
        // 2.0s source: no trim instruction at any tier
        for tier in EncodeTier::ALL {
            let params = tier_parameters(tier, 2.0, false, &policy());
            assert_eq!(params.trim_to_secs, None);
        }

        // 7.5s source: trim to exactly the 3.0s ceiling at every tier
        for tier in EncodeTier::ALL {
            let params = tier_parameters(tier, 3.0, true, &policy());
            assert_eq!(params.trim_to_secs, Some(3.0));
        }
    }

    #[test]
    fn test_tier_parameters_are_fresh_and_escalating() {
        let first = tier_parameters(EncodeTier::Initial, 3.0, false, &policy());
        let second = tier_parameters(EncodeTier::Reduced, 3.0, false, &policy());
        let third = tier_parameters(EncodeTier::Floor, 3.0, false, &policy());

        assert_eq!(first.bitrate_kbps, 666); // floor(250*8/3)
        assert_eq!(second.bitrate_kbps, 640); // floor(240*8/3)
        assert_eq!(third.bitrate_kbps, 586); // floor(220*8/3)

        assert!(first.crf < second.crf && second.crf < third.crf);
        assert!(first.speed < second.speed && second.speed < third.speed);
    }

    #[test]
    fn test_tier_artifacts_never_collide() {
        let out = Path::new("/work/result.webm");
        let paths: Vec<_> = EncodeTier::ALL
            .iter()
            .map(|t| tier_artifact_path(out, *t))
            .collect();

        assert_eq!(paths[0], Path::new("/work/result.initial.webm"));
        assert_eq!(paths[1], Path::new("/work/result.reduced.webm"));
        assert_eq!(paths[2], Path::new("/work/result.floor.webm"));
        for p in &paths {
            assert_ne!(p.as_path(), out);
        }
    }

    #[test]
    fn test_square_pad_filter_shape() {
        let filter = square_pad_filter(512);
        assert!(filter.contains("scale=512:512:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=512:512"));
        assert!(filter.contains("color=0x00000000"));
    }
}

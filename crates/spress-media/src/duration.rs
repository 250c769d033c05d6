//! Duration resolution.
//!
//! Containers lie: GIFs carry no duration at all, and plenty of videos
//! report nothing usable in their format metadata. This module resolves a
//! strictly positive duration for any input via an ordered fallback
//! chain, ending in a conservative fixed default. It never fails; a file
//! that cannot be probed at all is rejected earlier, before resolution.

use std::path::Path;
use tracing::{debug, warn};

use spress_models::first_match;

use crate::probe::{frame_accurate_duration, ProbeSummary};

/// Conservative default when no duration signal exists.
///
/// An underestimate is safer than zero or unbounded: it implies a higher
/// bitrate budget, biasing toward acceptable quality rather than a
/// truncation artifact.
pub const DEFAULT_DURATION_SECS: f64 = 2.5;

/// Resolve a best-effort duration for the probed input.
///
/// Precedence:
/// 1. Container-reported duration.
/// 2. For animated-image containers, a frame-accurate full-decode count.
/// 3. The video stream's frame count divided by its frame rate.
/// 4. The video stream's own duration field.
/// 5. The fixed default.
///
/// Always returns a finite value `> 0`.
pub async fn resolve_duration(path: &Path, summary: &ProbeSummary) -> f64 {
    if let Some(secs) = positive(summary.container_duration_secs) {
        debug!("Duration from container metadata: {:.2}s", secs);
        return secs;
    }

    if summary.is_animated_image {
        match frame_accurate_duration(path).await {
            Ok(counted) => {
                if let Some(secs) = positive(counted) {
                    debug!("Duration from frame-accurate count: {:.2}s", secs);
                    return secs;
                }
            }
            Err(e) => {
                // Degrade to the remaining fallbacks rather than propagate.
                warn!("Frame-accurate probe failed for {}: {}", path.display(), e);
            }
        }
    }

    match duration_from_stream(summary) {
        Some(secs) => {
            debug!("Duration from stream metadata: {:.2}s", secs);
            secs
        }
        None => {
            debug!("No usable duration signal, using {DEFAULT_DURATION_SECS}s default");
            DEFAULT_DURATION_SECS
        }
    }
}

/// Derive a duration from the primary video stream's own fields.
fn duration_from_stream(summary: &ProbeSummary) -> Option<f64> {
    let from_frames = summary
        .frame_count
        .filter(|&n| n > 0)
        .zip(summary.frame_rate.filter(|&r| r > 0.0))
        .map(|(frames, fps)| frames as f64 / fps);

    first_match([from_frames, summary.stream_duration_secs], |secs| {
        secs.is_finite() && *secs > 0.0
    })
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|secs| secs.is_finite() && *secs > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_summary() -> ProbeSummary {
        ProbeSummary {
            format_name: "matroska,webm".to_string(),
            container_duration_secs: None,
            is_animated_image: false,
            has_video_stream: true,
            frame_count: None,
            frame_rate: None,
            stream_duration_secs: None,
        }
    }

    #[tokio::test]
    async fn test_container_duration_wins() {
        let summary = ProbeSummary {
            container_duration_secs: Some(1.8),
            frame_count: Some(100),
            frame_rate: Some(10.0),
            stream_duration_secs: Some(9.0),
            ..bare_summary()
        };
        let secs = resolve_duration(Path::new("/nonexistent"), &summary).await;
        assert!((secs - 1.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_frame_math_beats_stream_duration() {
        let summary = ProbeSummary {
            frame_count: Some(90),
            frame_rate: Some(30.0),
            stream_duration_secs: Some(42.0),
            ..bare_summary()
        };
        let secs = resolve_duration(Path::new("/nonexistent"), &summary).await;
        assert!((secs - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stream_duration_fallback() {
        let summary = ProbeSummary {
            frame_count: Some(90),
            frame_rate: None, // frame math unavailable
            stream_duration_secs: Some(1.25),
            ..bare_summary()
        };
        let secs = resolve_duration(Path::new("/nonexistent"), &summary).await;
        assert!((secs - 1.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_metadata_yields_default() {
        let secs = resolve_duration(Path::new("/nonexistent"), &bare_summary()).await;
        assert!((secs - DEFAULT_DURATION_SECS).abs() < 1e-9);
        assert!(secs > 0.0);
    }

    #[tokio::test]
    async fn test_zero_frame_count_is_not_usable() {
        let summary = ProbeSummary {
            frame_count: Some(0),
            frame_rate: Some(30.0),
            ..bare_summary()
        };
        let secs = resolve_duration(Path::new("/nonexistent"), &summary).await;
        assert!((secs - DEFAULT_DURATION_SECS).abs() < 1e-9);
    }
}

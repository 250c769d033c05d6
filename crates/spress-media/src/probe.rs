//! FFprobe media information.
//!
//! Two probe passes exist: the cheap metadata probe used on every input,
//! and a frame-accurate pass (`frame_accurate_duration`) that forces a
//! full decode to count frames. The latter is the only reliable duration
//! source for GIF-style containers, whose format carries no duration.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Probe summary for one input, derived once per invocation.
#[derive(Debug, Clone)]
pub struct ProbeSummary {
    /// Container format name (e.g. "gif", "mov,mp4,m4a,3gp,3g2,mj2")
    pub format_name: String,
    /// Container-reported duration in seconds, when present and parseable
    pub container_duration_secs: Option<f64>,
    /// Whether this is an animated-image container without duration
    /// semantics (GIF, WEBP)
    pub is_animated_image: bool,
    /// Whether a video stream is present
    pub has_video_stream: bool,
    /// Frame count reported by the primary video stream
    pub frame_count: Option<u64>,
    /// Frame rate of the primary video stream, parsed from its rational
    pub frame_rate: Option<f64>,
    /// Duration field of the primary video stream
    pub stream_duration_secs: Option<f64>,
}

/// FFprobe JSON output shapes.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    nb_frames: Option<String>,
    nb_read_frames: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Probe a media file. Fails with `ProbeFailed` when the file cannot be
/// read as media at all.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<ProbeSummary> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe_failed(
            format!("FFprobe failed for {}", path.display()),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let format_name = probe
        .format
        .as_ref()
        .and_then(|f| f.format_name.clone())
        .unwrap_or_default();

    let container_duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds);

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let codec_name = video_stream
        .and_then(|s| s.codec_name.as_deref())
        .unwrap_or_default();

    Ok(ProbeSummary {
        is_animated_image: is_animated_image_container(&format_name, codec_name),
        has_video_stream: video_stream.is_some(),
        frame_count: video_stream
            .and_then(|s| s.nb_frames.as_deref())
            .and_then(|n| n.parse::<u64>().ok()),
        frame_rate: video_stream
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate),
        stream_duration_secs: video_stream
            .and_then(|s| s.duration.as_deref())
            .and_then(parse_seconds),
        format_name,
        container_duration_secs,
    })
}

/// Frame-accurate duration via a full decode.
///
/// Forces FFprobe to count every frame of the primary video stream and
/// combines the count with the stream's frame rate. Deliberately
/// expensive; callers restrict it to animated-image containers.
pub async fn frame_accurate_duration(path: impl AsRef<Path>) -> MediaResult<Option<f64>> {
    let path = path.as_ref();

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-count_frames",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=nb_read_frames,r_frame_rate",
            "-print_format",
            "json",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe_failed(
            format!("Frame-count probe failed for {}", path.display()),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let Some(stream) = probe.streams.first() else {
        return Ok(None);
    };

    let frames = stream
        .nb_read_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok());
    let fps = stream.r_frame_rate.as_deref().and_then(parse_frame_rate);

    Ok(match (frames, fps) {
        (Some(frames), Some(fps)) if frames > 0 && fps > 0.0 => Some(frames as f64 / fps),
        _ => None,
    })
}

/// Whether the container is an animated-image format with no duration
/// semantics (GIF, WEBP).
fn is_animated_image_container(format_name: &str, codec_name: &str) -> bool {
    format_name.contains("gif")
        || codec_name == "gif"
        || format_name.contains("webp")
        || codec_name == "webp"
}

/// Parse a seconds string, rejecting non-finite and non-positive values.
fn parse_seconds(s: &str) -> Option<f64> {
    let secs: f64 = s.parse().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

/// Parse a rational frame-rate string (e.g. "30/1", "30000/1001").
///
/// A zero or unparseable denominator means the numerator is the rate.
pub(crate) fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().unwrap_or(0.0);
        let rate = if den > 0.0 { num / den } else { num };
        return (rate.is_finite() && rate > 0.0).then_some(rate);
    }
    s.parse().ok().filter(|r: &f64| r.is_finite() && *r > 0.0)
}

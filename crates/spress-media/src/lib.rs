//! FFmpeg CLI wrapper and sticker conformance engines.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and execution
//! - FFprobe-based media probing, including a frame-accurate pass for
//!   containers that carry no duration metadata
//! - Duration resolution with an ordered fallback chain
//! - Bitrate planning from a size budget
//! - The three-tier VP9 transcode engine for animated stickers
//! - The static-image conformance engine (PNG path)

pub mod bitrate;
pub mod command;
pub mod duration;
pub mod error;
pub mod fs_utils;
pub mod imaging;
pub mod probe;
pub mod transcode;

pub use bitrate::plan_bitrate;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use duration::{resolve_duration, DEFAULT_DURATION_SECS};
pub use error::{MediaError, MediaResult};
pub use fs_utils::move_file;
pub use imaging::{conform_image, ImageQuality};
pub use probe::{probe_media, ProbeSummary};
pub use transcode::transcode_to_webm;

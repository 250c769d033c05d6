//! Input format classification.
//!
//! Decides whether a declared mime type / filename is convertible at all,
//! and whether it takes the static-image path or the video path. The
//! declared type comes from the transport layer and is untrusted, so the
//! filename extension serves as a fallback signal.

use serde::{Deserialize, Serialize};

/// Mime types accepted for the animated/video path.
const ANIMATED_MIMES: &[&str] = &[
    "image/gif",
    "video/mp4",
    "video/quicktime", // MOV
    "video/webm",
    "video/x-msvideo",  // AVI
    "video/x-matroska", // MKV
    "video/mpeg",
    "image/webp", // may be animated; routed to the video path
];

/// Mime types accepted for the static raster path.
const STATIC_MIMES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Mime prefixes that must never classify as a static image, even when
/// they also appear in the general allow-list. GIF and WEBP can carry
/// animation; treating them as static would silently drop every frame
/// but the first.
const NEVER_STATIC_MIMES: &[&str] = &["image/gif", "video/", "image/webp"];

const ANIMATED_EXTENSIONS: &[&str] = &["gif", "mp4", "mov", "webm", "avi", "mkv", "mpeg", "mpg"];
const STATIC_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extension fallback for the general allow-list (animated + static + webp).
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "gif", "mp4", "mov", "webm", "avi", "mkv", "mpeg", "mpg", "webp", "png", "jpg", "jpeg",
];

/// Result of classifying a declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the input is convertible at all
    pub supported: bool,
    /// Whether the input takes the static-image path (PNG output)
    pub is_static_image: bool,
}

/// Classify a declared mime type and/or filename.
///
/// When neither signal is reliable the input routes to the video path:
/// the transcode engine handles single-frame content correctly, whereas
/// the image path would drop animation.
pub fn classify(mime: Option<&str>, file_name: Option<&str>) -> Classification {
    let supported = is_supported(mime, file_name);
    let is_static_image = supported && is_static_image_signal(mime, file_name);

    Classification {
        supported,
        is_static_image,
    }
}

fn is_supported(mime: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(mime) = mime {
        if ANIMATED_MIMES.iter().chain(STATIC_MIMES).any(|m| mime.contains(m)) {
            return true;
        }
    }

    matches_extension(file_name, SUPPORTED_EXTENSIONS)
}

fn is_static_image_signal(mime: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(mime) = mime {
        // Anything that can carry animation is excluded outright.
        if NEVER_STATIC_MIMES.iter().any(|m| mime.contains(m)) {
            return false;
        }
        if STATIC_MIMES.iter().any(|m| mime.contains(m)) {
            return true;
        }
    }

    matches_extension(file_name, STATIC_EXTENSIONS)
}

fn matches_extension(file_name: Option<&str>, allowed: &[&str]) -> bool {
    let Some(name) = file_name else {
        return false;
    };

    match name.rsplit_once('.') {
        Some((_, ext)) => allowed.iter().any(|a| ext.eq_ignore_ascii_case(a)),
        None => false,
    }
}

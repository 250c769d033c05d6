//! VP9 encode escalation tiers.
//!
//! The transcode engine makes at most three attempts at meeting the size
//! ceiling, each trading quality for compression. The tier table is fixed:
//! retrying at the same settings cannot shrink the output, and a fourth
//! attempt yields diminishing returns for unbounded effort.

use serde::{Deserialize, Serialize};

use crate::policy::SIZE_BUDGET_TIERS_KIB;

/// Video codec for animated stickers (alpha-capable VP9).
pub const VIDEO_CODEC: &str = "libvpx-vp9";

/// Pixel format carrying an alpha channel.
pub const PIXEL_FORMAT: &str = "yuva420p";

/// VP9 quality preset.
pub const QUALITY_PRESET: &str = "good";

/// One attempt in the bounded escalation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeTier {
    /// Best quality: full size budget, CRF 30, slowest speed.
    Initial,
    /// First escalation: tighter budget, CRF 35, speed 1.
    Reduced,
    /// Terminal escalation: tightest budget, CRF 45, speed 2.
    /// Its output is accepted regardless of measured size.
    Floor,
}

impl EncodeTier {
    /// All tiers in escalation order.
    pub const ALL: [EncodeTier; 3] = [EncodeTier::Initial, EncodeTier::Reduced, EncodeTier::Floor];

    /// Size budget handed to the bitrate planner, in KiB.
    pub fn size_budget_kib(self) -> u32 {
        SIZE_BUDGET_TIERS_KIB[self.index()]
    }

    /// Constant Rate Factor for this tier (higher = more compression).
    pub fn crf(self) -> u8 {
        match self {
            EncodeTier::Initial => 30,
            EncodeTier::Reduced => 35,
            EncodeTier::Floor => 45,
        }
    }

    /// VP9 `-speed` value for this tier (higher = faster, lower quality).
    pub fn speed(self) -> u8 {
        match self {
            EncodeTier::Initial => 0,
            EncodeTier::Reduced => 1,
            EncodeTier::Floor => 2,
        }
    }

    /// Whether this tier's result is accepted unconditionally.
    pub fn is_final(self) -> bool {
        matches!(self, EncodeTier::Floor)
    }

    /// Zero-based position in the escalation ladder.
    pub fn index(self) -> usize {
        match self {
            EncodeTier::Initial => 0,
            EncodeTier::Reduced => 1,
            EncodeTier::Floor => 2,
        }
    }
}

impl std::fmt::Display for EncodeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeTier::Initial => write!(f, "initial"),
            EncodeTier::Reduced => write!(f, "reduced"),
            EncodeTier::Floor => write!(f, "floor"),
        }
    }
}

/// Concrete encoder parameters for one tier.
///
/// A fresh value is computed per tier; tiers never mutate a shared
/// parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParameters {
    /// Target bitrate in kbit/s (also used as maxrate; bufsize is 2x)
    pub bitrate_kbps: u32,
    /// Constant Rate Factor
    pub crf: u8,
    /// VP9 speed value
    pub speed: u8,
    /// Trim the output to exactly this many seconds, if set.
    /// Absent for inputs already at or under the duration ceiling; a
    /// redundant trim at or near the source duration can truncate the
    /// output to zero frames.
    pub trim_to_secs: Option<f64>,
}

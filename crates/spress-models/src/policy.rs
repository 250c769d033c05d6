//! Telegram sticker conformance policy.
//!
//! Fixed output constraints a valid sticker artifact must satisfy.
//! These are Telegram platform limits, not tunables, so they are
//! process-wide constants rather than runtime configuration.

/// Maximum accepted input file size (50 MiB).
pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// Output canvas side in pixels (square).
pub const OUTPUT_SIDE: u32 = 512;

/// Maximum duration of an animated sticker in seconds.
pub const MAX_OUTPUT_DURATION_SECS: f64 = 3.0;

/// Hard ceiling on the output artifact size (256 KiB).
pub const MAX_OUTPUT_BYTES: u64 = 256 * 1024;

/// Size budgets per escalation tier, in KiB.
///
/// Each tier targets further below the hard ceiling because the
/// bitrate-to-size estimate ignores container overhead; a retry must
/// shrink the target, not merely repeat it.
pub const SIZE_BUDGET_TIERS_KIB: [u32; 3] = [250, 240, 220];

/// Sticker conformance policy.
///
/// Bundles the platform limits so engines take one parameter instead of
/// reading globals, which also lets tests tighten individual limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickerPolicy {
    /// Maximum accepted input file size in bytes
    pub max_input_bytes: u64,
    /// Output square side in pixels
    pub output_side: u32,
    /// Maximum output duration in seconds
    pub max_output_duration_secs: f64,
    /// Hard ceiling on output size in bytes
    pub max_output_bytes: u64,
    /// Size budgets per escalation tier in KiB
    pub size_budget_tiers_kib: [u32; 3],
}

impl Default for StickerPolicy {
    fn default() -> Self {
        Self {
            max_input_bytes: MAX_INPUT_BYTES,
            output_side: OUTPUT_SIDE,
            max_output_duration_secs: MAX_OUTPUT_DURATION_SECS,
            max_output_bytes: MAX_OUTPUT_BYTES,
            size_budget_tiers_kib: SIZE_BUDGET_TIERS_KIB,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budgets_stay_below_hard_ceiling() {
        let policy = StickerPolicy::default();
        for budget in policy.size_budget_tiers_kib {
            assert!(u64::from(budget) * 1024 < policy.max_output_bytes);
        }
    }

    #[test]
    fn test_budgets_monotonically_decreasing() {
        let tiers = SIZE_BUDGET_TIERS_KIB;
        assert!(tiers[0] > tiers[1]);
        assert!(tiers[1] > tiers[2]);
    }
}

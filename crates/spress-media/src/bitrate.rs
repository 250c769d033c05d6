//! Bitrate planning.

/// Plan a constant bitrate (kbit/s) that lands a `budget_kib` output over
/// `duration_secs` of video.
///
/// First-order estimate only: container overhead is ignored, which is why
/// callers pass budgets already below the hard size ceiling.
pub fn plan_bitrate(budget_kib: u32, duration_secs: f64) -> u32 {
    ((f64::from(budget_kib) * 8.0) / duration_secs).floor() as u32
}

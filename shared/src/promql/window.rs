//! Range-vector window sizing.

/// Smallest range window, in seconds.
pub const MIN_RATE_WINDOW_SECS: i64 = 30;

/// Returns the `rate`/`increase` range window for a query interval.
///
/// Short intervals use the interval itself (never under 30s); longer
/// intervals step up through fixed windows so counters are neither too
/// noisy nor too coarse.
///
/// | interval          | window       |
/// |-------------------|--------------|
/// | < 5m              | interval, ≥ 30s |
/// | < 1h              | 60s          |
/// | < 1d              | 300s         |
/// | < 7d              | 900s         |
/// | otherwise         | 3600s        |
#[must_use]
pub fn get_rate_window(interval_secs: i64) -> i64 {
    match interval_secs {
        i if i < 300 => i.max(MIN_RATE_WINDOW_SECS),
        i if i < 3600 => 60,
        i if i < 86_400 => 300,
        i if i < 604_800 => 900,
        _ => 3600,
    }
}

/// Renders a duration in seconds as a PromQL range literal.
#[must_use]
pub fn range_literal(secs: i64) -> String {
    format!("{secs}s")
}

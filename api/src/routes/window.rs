//! Time window query parameters.

use chrono::{DateTime, Utc};
use shared::models::{RelativeRange, ResolvedWindow, TimeWindow, TimeWindowError};

/// Resolves `window`/`start`/`end` query parameters against `now`.
///
/// An explicit `start` and `end` pair wins over `window`. With neither, the
/// window falls back to `default`.
pub fn resolve_window(
    window: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    default: RelativeRange,
    now: DateTime<Utc>,
) -> Result<ResolvedWindow, TimeWindowError> {
    let window = match (start, end, window) {
        (Some(start), Some(end), _) => TimeWindow::absolute(start, end),
        (_, _, Some(value)) => TimeWindow::relative(value.parse::<RelativeRange>()?),
        _ => TimeWindow::relative(default),
    };
    window.resolve(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_window() {
        let resolved = resolve_window(None, None, None, RelativeRange::Hours24, now()).unwrap();
        assert_eq!(resolved.end, now());
        assert_eq!(resolved.start, now() - Duration::hours(24));
    }

    #[test]
    fn test_relative_window() {
        let resolved = resolve_window(Some("15m"), None, None, RelativeRange::Hours24, now()).unwrap();
        assert_eq!(resolved.interval_secs(), 900);
    }

    #[test]
    fn test_absolute_wins() {
        let start = now() - Duration::hours(2);
        let resolved =
            resolve_window(Some("7d"), Some(start), Some(now()), RelativeRange::Hours24, now())
                .unwrap();
        assert_eq!(resolved.start, start);
    }

    #[test]
    fn test_rejects_unknown_preset_and_empty_range() {
        assert!(resolve_window(Some("2h"), None, None, RelativeRange::Hours1, now()).is_err());
        assert!(resolve_window(None, Some(now()), Some(now()), RelativeRange::Hours1, now()).is_err());
    }
}

//! Time window model.
//!
//! A `TimeWindow` is what the user picked (a relative preset such as "last
//! 15 minutes", or an absolute range). It is resolved into concrete instants
//! only when a query is built, so a stored relative window always slides
//! with the clock.

use chrono::{DateTime, Duration, Utc};
use nom::{
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_res},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing or resolving a time window.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeWindowError {
    /// The relative value is not of the form `<digits><m|h|d>`.
    #[error("Invalid relative window syntax: '{0}'")]
    Syntax(String),

    /// The relative value parsed but is not one of the offered presets.
    #[error("Unsupported relative window: '{0}'. Expected one of {presets}", presets = RelativeRange::PRESETS.join(", "))]
    UnsupportedPreset(String),

    /// An absolute window does not end after it starts.
    #[error("Window end ({end}) must be after start ({start})")]
    EmptyRange {
        /// Start of the rejected window.
        start: DateTime<Utc>,
        /// End of the rejected window.
        end: DateTime<Utc>,
    },
}

/// A relative range preset such as `15m` or `7d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelativeRange {
    /// Last 15 minutes.
    Minutes15,
    /// Last hour.
    Hours1,
    /// Last 3 hours.
    Hours3,
    /// Last 6 hours.
    Hours6,
    /// Last 12 hours.
    Hours12,
    /// Last 24 hours.
    Hours24,
    /// Last 7 days.
    Days7,
    /// Last 30 days.
    Days30,
}

impl RelativeRange {
    /// All preset literals, shortest first.
    pub const PRESETS: [&'static str; 8] = ["15m", "1h", "3h", "6h", "12h", "24h", "7d", "30d"];

    /// Returns the preset literal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes15 => "15m",
            Self::Hours1 => "1h",
            Self::Hours3 => "3h",
            Self::Hours6 => "6h",
            Self::Hours12 => "12h",
            Self::Hours24 => "24h",
            Self::Days7 => "7d",
            Self::Days30 => "30d",
        }
    }

    /// Returns the length of the range in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        match self {
            Self::Minutes15 => 15 * 60,
            Self::Hours1 => 3600,
            Self::Hours3 => 3 * 3600,
            Self::Hours6 => 6 * 3600,
            Self::Hours12 => 12 * 3600,
            Self::Hours24 => 24 * 3600,
            Self::Days7 => 7 * 86400,
            Self::Days30 => 30 * 86400,
        }
    }

    /// Returns the length of the range.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.as_secs())
    }
}

impl std::fmt::Display for RelativeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelativeRange {
    type Err = TimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (_, (amount, unit)) = all_consuming(relative_literal)
            .parse(trimmed)
            .map_err(|_| TimeWindowError::Syntax(trimmed.to_string()))?;

        match (amount, unit) {
            (15, 'm') => Ok(Self::Minutes15),
            (1, 'h') => Ok(Self::Hours1),
            (3, 'h') => Ok(Self::Hours3),
            (6, 'h') => Ok(Self::Hours6),
            (12, 'h') => Ok(Self::Hours12),
            (24, 'h') => Ok(Self::Hours24),
            (7, 'd') => Ok(Self::Days7),
            (30, 'd') => Ok(Self::Days30),
            _ => Err(TimeWindowError::UnsupportedPreset(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for RelativeRange {
    type Error = TimeWindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelativeRange> for String {
    fn from(range: RelativeRange) -> Self {
        range.as_str().to_string()
    }
}

fn relative_literal(input: &str) -> IResult<&str, (u32, char)> {
    let (input, amount) = map_res(digit1, |s: &str| s.parse::<u32>()).parse(input)?;
    let (input, unit) = one_of("mhd").parse(input)?;
    Ok((input, (amount, unit)))
}

/// A time window as selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimeWindow {
    /// A window ending now.
    Relative {
        /// The preset length.
        value: RelativeRange,
    },
    /// A fixed window.
    Absolute {
        /// Window start.
        start: DateTime<Utc>,
        /// Window end.
        end: DateTime<Utc>,
    },
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::Relative {
            value: RelativeRange::Hours1,
        }
    }
}

impl TimeWindow {
    /// Creates a relative window.
    #[must_use]
    pub const fn relative(value: RelativeRange) -> Self {
        Self::Relative { value }
    }

    /// Creates an absolute window.
    #[must_use]
    pub const fn absolute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Absolute { start, end }
    }

    /// Resolves the window against `now`.
    ///
    /// # Errors
    ///
    /// Returns `TimeWindowError::EmptyRange` if an absolute window does not
    /// end after it starts.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ResolvedWindow, TimeWindowError> {
        match *self {
            Self::Relative { value } => Ok(ResolvedWindow {
                start: now - value.duration(),
                end: now,
            }),
            Self::Absolute { start, end } => {
                if end <= start {
                    return Err(TimeWindowError::EmptyRange { start, end });
                }
                Ok(ResolvedWindow { start, end })
            }
        }
    }

    /// Resolves the window against the current time.
    ///
    /// # Errors
    ///
    /// See [`TimeWindow::resolve`].
    pub fn resolve_now(&self) -> Result<ResolvedWindow, TimeWindowError> {
        self.resolve(Utc::now())
    }
}

/// A window with concrete bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (exclusive).
    pub end: DateTime<Utc>,
}

impl ResolvedWindow {
    /// Returns the window length in whole seconds.
    #[must_use]
    pub fn interval_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Returns true if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

//! Metric catalog model.
//!
//! Defines the `Metric` catalog entry, its `MetricKind`, and the
//! `Aggregation` choices a query can apply to it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Kind of metric.
///
/// The kind decides which aggregations are valid and how the query is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// A monotonically increasing count of occurrences (e.g., requests served).
    Events,
    /// A sampled value that can go up or down (e.g., queue depth).
    Values,
    /// A histogram of observations (e.g., request latency).
    Distribution,
}

impl MetricKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Values => "values",
            Self::Distribution => "distribution",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetricValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "values" => Ok(Self::Values),
            "distribution" => Ok(Self::Distribution),
            other => Err(MetricValidationError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Aggregation applied to a metric query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Total increase over the window.
    Sum,
    /// Per-second rate.
    Rate,
    /// Per-minute rate.
    RatePerMinute,
    /// Average value.
    Avg,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// 50th percentile.
    P50,
    /// 90th percentile.
    P90,
    /// 95th percentile.
    P95,
    /// 99th percentile.
    P99,
}

impl Aggregation {
    /// Returns the wire name of this aggregation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Rate => "rate",
            Self::RatePerMinute => "rate_per_minute",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::P50 => "p50",
            Self::P90 => "p90",
            Self::P95 => "p95",
            Self::P99 => "p99",
        }
    }

    /// Returns the quantile for percentile aggregations.
    #[must_use]
    pub const fn quantile(&self) -> Option<f64> {
        match self {
            Self::P50 => Some(0.5),
            Self::P90 => Some(0.9),
            Self::P95 => Some(0.95),
            Self::P99 => Some(0.99),
            _ => None,
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = MetricValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let agg = match s.trim().to_lowercase().as_str() {
            "sum" => Self::Sum,
            "rate" => Self::Rate,
            "rate_per_minute" => Self::RatePerMinute,
            "avg" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            "p50" => Self::P50,
            "p90" => Self::P90,
            "p95" => Self::P95,
            "p99" => Self::P99,
            other => return Err(MetricValidationError::UnknownAggregation(other.to_string())),
        };
        Ok(agg)
    }
}

/// A metric available in the catalog.
///
/// # Example
///
/// ```
/// use shared::models::{Metric, MetricKind};
///
/// let metric = Metric::new("http_requests_total", MetricKind::Events)
///     .with_display_as("HTTP requests")
///     .with_label("status")
///     .with_label("route");
///
/// assert!(metric.validate_metric().is_ok());
/// assert_eq!(metric.labels, vec!["status", "route"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Metric {
    /// The metric name as stored in the time-series backend.
    #[validate(length(min = 1, message = "Metric key cannot be empty"))]
    pub key: String,

    /// The metric kind.
    pub kind: MetricKind,

    /// Human-readable name shown in pickers.
    #[serde(default)]
    pub display_as: String,

    /// Optional description of the metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Label names the metric can be filtered or grouped by.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Optional unit (e.g., "seconds", "bytes").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Errors that can occur during metric validation.
#[derive(Debug, Error)]
pub enum MetricValidationError {
    /// The metric key is empty.
    #[error("Metric key cannot be empty")]
    EmptyKey,

    /// The metric key is not a valid metric name.
    #[error("Invalid metric name: '{0}'")]
    InvalidKey(String),

    /// A label name is not a valid identifier.
    #[error("Invalid label name: '{0}'")]
    InvalidLabelName(String),

    /// The metric kind is not one of events, values, or distribution.
    #[error("Unsupported metric kind: '{0}'")]
    UnsupportedKind(String),

    /// The aggregation name is unknown.
    #[error("Unknown aggregation: '{0}'")]
    UnknownAggregation(String),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Metric {
    /// Creates a new catalog metric whose display name defaults to its key.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: MetricKind) -> Self {
        let key = key.into();
        Self {
            display_as: key.clone(),
            key,
            kind,
            description: None,
            labels: Vec::new(),
            unit: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_as(mut self, display_as: impl Into<String>) -> Self {
        self.display_as = display_as.into();
        self
    }

    /// Adds a label name.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Returns true if the metric exposes the given label.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Validates the metric.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or not a valid metric name, or a
    /// label name is not a valid Prometheus label identifier.
    pub fn validate_metric(&self) -> Result<(), MetricValidationError> {
        if self.key.is_empty() {
            return Err(MetricValidationError::EmptyKey);
        }
        if !is_valid_metric_name(&self.key) {
            return Err(MetricValidationError::InvalidKey(self.key.clone()));
        }

        if let Some(bad) = self.labels.iter().find(|l| !is_valid_label_name(l)) {
            return Err(MetricValidationError::InvalidLabelName(bad.clone()));
        }

        self.validate()?;
        Ok(())
    }
}

/// Returns true if `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`.
#[must_use]
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if `name` matches `[a-zA-Z_:][a-zA-Z0-9_:]*`.
#[must_use]
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

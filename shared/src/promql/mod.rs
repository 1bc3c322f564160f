//! PromQL generation for metric selections.
//!
//! Turns a catalog metric plus the user's filters, aggregation, window, and
//! group-by labels into a PromQL expression. The shape of the expression is
//! decided by the metric kind, and the aggregation must be one the kind
//! allows (see [`aggregation`]).
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use shared::models::{Aggregation, Filter, Metric, MetricKind};
//! use shared::promql::{generate_prom_query, QueryParams};
//!
//! let metric = Metric::new("http_requests_total", MetricKind::Events).with_label("status");
//! let filters = [Filter::equals("status", "500")];
//! let end = Utc::now();
//!
//! let query = generate_prom_query(&QueryParams {
//!     metric: &metric,
//!     filters: &filters,
//!     start: end - Duration::minutes(15),
//!     end,
//!     aggregation: Aggregation::Sum,
//!     agg_over_time: false,
//!     group_by: &[],
//! })
//! .unwrap();
//!
//! assert_eq!(query, r#"sum(increase(http_requests_total{status="500"}[60s]))"#);
//! ```

pub mod aggregation;
mod generator;
mod matchers;
mod window;

use crate::models::{Aggregation, MetricKind, MetricValidationError, TimeWindowError};
use thiserror::Error;

pub use aggregation::{
    allowed_aggregations, default_aggregation, is_allowed, reconcile_aggregation, MetricSelection,
};
pub use generator::{build_block_query, generate_prom_query, GeneratedQuery, QueryParams};
pub use matchers::{build_label_matchers, escape_promql_value, selector};
pub use window::{get_rate_window, range_literal, MIN_RATE_WINDOW_SECS};

/// Errors that can occur while building a query.
#[derive(Debug, Error)]
pub enum PromQlError {
    /// The aggregation is not in the kind's allowed set.
    #[error("Aggregation '{aggregation}' is not valid for {kind} metrics")]
    InvalidAggregation {
        /// The metric kind.
        kind: MetricKind,
        /// The rejected aggregation.
        aggregation: Aggregation,
    },

    /// The query window does not end after it starts.
    #[error("Query window must end after it starts")]
    EmptyWindow,

    /// A filter or group-by label is not a valid label name.
    #[error("Invalid label name: '{0}'")]
    InvalidLabel(String),

    /// No metric has been selected.
    #[error("No metric selected")]
    NoMetricSelected,

    /// The configuration refers to a different metric than the one supplied.
    #[error("Configuration is for metric '{expected}', got '{found}'")]
    MetricMismatch {
        /// Key named by the configuration.
        expected: String,
        /// Key of the supplied metric.
        found: String,
    },

    /// The metric or its kind is invalid.
    #[error(transparent)]
    Metric(#[from] MetricValidationError),

    /// The time window could not be resolved.
    #[error(transparent)]
    TimeWindow(#[from] TimeWindowError),
}

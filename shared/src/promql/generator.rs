//! PromQL expression generation.

use super::aggregation::{is_allowed, reconcile_aggregation};
use super::matchers::selector;
use super::window::{get_rate_window, range_literal};
use super::PromQlError;
use crate::models::{
    is_valid_label_name, is_valid_metric_name, Aggregation, BlockConfig, Filter, Metric,
    MetricKind, MetricValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inputs for [`generate_prom_query`].
#[derive(Debug, Clone, Copy)]
pub struct QueryParams<'a> {
    /// The metric to query.
    pub metric: &'a Metric,
    /// Label filters.
    pub filters: &'a [Filter],
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
    /// Aggregation; must be valid for the metric kind.
    pub aggregation: Aggregation,
    /// For values metrics, aggregate each series over the whole window first.
    pub agg_over_time: bool,
    /// Labels to group by.
    pub group_by: &'a [String],
}

/// Generates a PromQL expression for a metric selection.
///
/// The shape depends on the metric kind:
///
/// - distribution: `histogram_quantile(q, sum(rate(sel[w])))`
/// - events: `sum(increase(sel[w]))`, or `rate` for the rate aggregations
/// - values: `agg(sel)`, or `agg_over_time(sel[interval])` when
///   `agg_over_time` is set
///
/// `w` is [`get_rate_window`] of the query interval. A non-empty `group_by`
/// adds a `by (...)` clause to the outer aggregation.
///
/// # Errors
///
/// Returns an error if the window is empty, the aggregation is not valid for
/// the metric kind, the metric key is not a valid metric name, or a filter or
/// group-by label is not a valid label name.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use shared::models::{Aggregation, Metric, MetricKind};
/// use shared::promql::{generate_prom_query, QueryParams};
///
/// let metric = Metric::new("queue_depth", MetricKind::Values);
/// let end = Utc::now();
/// let query = generate_prom_query(&QueryParams {
///     metric: &metric,
///     filters: &[],
///     start: end - Duration::hours(1),
///     end,
///     aggregation: Aggregation::Max,
///     agg_over_time: true,
///     group_by: &[],
/// })
/// .unwrap();
///
/// assert_eq!(query, "max_over_time(queue_depth[3600s])");
/// ```
pub fn generate_prom_query(params: &QueryParams<'_>) -> Result<String, PromQlError> {
    let interval = (params.end - params.start).num_seconds();
    if interval <= 0 {
        return Err(PromQlError::EmptyWindow);
    }

    if !is_valid_metric_name(&params.metric.key) {
        return Err(MetricValidationError::InvalidKey(params.metric.key.clone()).into());
    }

    let kind = params.metric.kind;
    let aggregation = params.aggregation;
    if !is_allowed(kind, aggregation) {
        return Err(PromQlError::InvalidAggregation { kind, aggregation });
    }

    if let Some(bad) = params
        .filters
        .iter()
        .filter(|f| f.is_complete())
        .map(|f| f.label.trim())
        .chain(params.group_by.iter().map(String::as_str))
        .find(|label| !is_valid_label_name(label))
    {
        return Err(PromQlError::InvalidLabel(bad.to_string()));
    }

    let sel = selector(&params.metric.key, params.filters);
    let by = by_clause(params.group_by);
    let window = range_literal(get_rate_window(interval));

    let query = match kind {
        MetricKind::Distribution => {
            let quantile = aggregation
                .quantile()
                .ok_or(PromQlError::InvalidAggregation { kind, aggregation })?;
            format!("histogram_quantile({quantile}, sum{by}(rate({sel}[{window}])))")
        }
        MetricKind::Events => match aggregation {
            Aggregation::Rate => format!("sum{by}(rate({sel}[{window}]))"),
            Aggregation::RatePerMinute => format!("sum{by}(rate({sel}[{window}])) * 60"),
            _ => format!("sum{by}(increase({sel}[{window}]))"),
        },
        MetricKind::Values => {
            if params.agg_over_time {
                let inner = format!("{aggregation}_over_time({sel}[{}])", range_literal(interval));
                if params.group_by.is_empty() {
                    inner
                } else {
                    format!("{aggregation}{by}({inner})")
                }
            } else {
                format!("{aggregation}{by}({sel})")
            }
        }
    };

    tracing::debug!(metric = %params.metric.key, %kind, %aggregation, %query, "Generated PromQL");
    Ok(query)
}

fn by_clause(group_by: &[String]) -> String {
    if group_by.is_empty() {
        String::new()
    } else {
        format!(" by ({}) ", group_by.join(", "))
    }
}

/// A query generated for a block configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// The PromQL expression.
    pub query: String,
    /// The aggregation actually used.
    pub aggregation: Aggregation,
    /// True if a requested aggregation was replaced by the kind default.
    /// Filling in the default when none was requested is not a correction.
    pub aggregation_corrected: bool,
    /// Resolved window start.
    pub start: DateTime<Utc>,
    /// Resolved window end.
    pub end: DateTime<Utc>,
    /// Range window used for rate/increase, in seconds.
    pub rate_window_secs: i64,
}

/// Builds the query for a chart or number block against its catalog metric.
///
/// The configured aggregation goes through the validity gate first, and the
/// block's time window is resolved against `now`.
///
/// # Errors
///
/// Returns an error if the metric key does not match the configuration, the
/// window cannot be resolved, or generation fails.
pub fn build_block_query(
    config: &BlockConfig,
    metric: &Metric,
    now: DateTime<Utc>,
) -> Result<GeneratedQuery, PromQlError> {
    match config.metric_key.as_deref() {
        None => return Err(PromQlError::NoMetricSelected),
        Some(key) if key != metric.key => {
            return Err(PromQlError::MetricMismatch {
                expected: key.to_string(),
                found: metric.key.clone(),
            })
        }
        Some(_) => {}
    }

    let aggregation = reconcile_aggregation(metric.kind, config.aggregation);
    let window = config.time_window.resolve(now)?;

    let query = generate_prom_query(&QueryParams {
        metric,
        filters: &config.filters,
        start: window.start,
        end: window.end,
        aggregation,
        agg_over_time: config.agg_over_time,
        group_by: &config.group_by,
    })?;

    Ok(GeneratedQuery {
        query,
        aggregation,
        aggregation_corrected: config.aggregation.is_some_and(|a| a != aggregation),
        start: window.start,
        end: window.end,
        rate_window_secs: get_rate_window(window.interval_secs()),
    })
}

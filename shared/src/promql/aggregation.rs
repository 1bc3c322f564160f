//! Aggregation validity per metric kind.
//!
//! Each [`MetricKind`] admits a fixed set of aggregations. Whenever the
//! selected metric changes, the current aggregation is checked against the
//! new kind and replaced by the kind's default if it no longer applies.

use super::PromQlError;
use crate::models::{Aggregation, Filter, Metric, MetricKind};

const EVENTS: &[Aggregation] = &[
    Aggregation::Sum,
    Aggregation::Rate,
    Aggregation::RatePerMinute,
];
const VALUES: &[Aggregation] = &[Aggregation::Avg, Aggregation::Min, Aggregation::Max];
const DISTRIBUTION: &[Aggregation] = &[
    Aggregation::P50,
    Aggregation::P90,
    Aggregation::P95,
    Aggregation::P99,
];

/// Returns the aggregations valid for `kind`.
#[must_use]
pub const fn allowed_aggregations(kind: MetricKind) -> &'static [Aggregation] {
    match kind {
        MetricKind::Events => EVENTS,
        MetricKind::Values => VALUES,
        MetricKind::Distribution => DISTRIBUTION,
    }
}

/// Returns the aggregation selected when nothing valid is chosen.
#[must_use]
pub const fn default_aggregation(kind: MetricKind) -> Aggregation {
    match kind {
        MetricKind::Events => Aggregation::Sum,
        MetricKind::Values => Aggregation::Avg,
        MetricKind::Distribution => Aggregation::P95,
    }
}

/// Returns true if `aggregation` is valid for `kind`.
#[must_use]
pub fn is_allowed(kind: MetricKind, aggregation: Aggregation) -> bool {
    allowed_aggregations(kind).contains(&aggregation)
}

/// Returns `current` if it is valid for `kind`, otherwise the kind default.
#[must_use]
pub fn reconcile_aggregation(kind: MetricKind, current: Option<Aggregation>) -> Aggregation {
    match current {
        Some(agg) if is_allowed(kind, agg) => agg,
        _ => default_aggregation(kind),
    }
}

/// Query builder selection state.
///
/// Holds the picked metric together with the choices that depend on it and
/// keeps them consistent as the metric changes.
#[derive(Debug, Clone, Default)]
pub struct MetricSelection {
    metric: Option<Metric>,
    aggregation: Option<Aggregation>,
    filters: Vec<Filter>,
    group_by: Vec<String>,
    agg_over_time: bool,
}

impl MetricSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a metric and returns the resulting aggregation.
    ///
    /// The aggregation is kept when the new kind allows it and reset to the
    /// kind default otherwise. Filters and group-by labels the new metric
    /// does not expose are dropped.
    pub fn select_metric(&mut self, metric: Metric) -> Aggregation {
        let aggregation = reconcile_aggregation(metric.kind, self.aggregation);
        if self.aggregation != Some(aggregation) {
            tracing::debug!(
                metric = %metric.key,
                kind = %metric.kind,
                previous = ?self.aggregation,
                %aggregation,
                "Aggregation reset for new metric kind"
            );
        }

        self.filters
            .retain(|f| !f.is_complete() || metric.has_label(f.label.trim()));
        self.group_by.retain(|label| metric.has_label(label));
        self.aggregation = Some(aggregation);
        self.metric = Some(metric);
        aggregation
    }

    /// Chooses an aggregation for the selected metric.
    ///
    /// # Errors
    ///
    /// Returns `PromQlError::InvalidAggregation` if the selected metric's kind
    /// does not allow it, or `PromQlError::NoMetricSelected` before a metric
    /// is picked.
    pub fn set_aggregation(&mut self, aggregation: Aggregation) -> Result<(), PromQlError> {
        let kind = self
            .metric
            .as_ref()
            .map(|m| m.kind)
            .ok_or(PromQlError::NoMetricSelected)?;
        if !is_allowed(kind, aggregation) {
            return Err(PromQlError::InvalidAggregation { kind, aggregation });
        }
        self.aggregation = Some(aggregation);
        Ok(())
    }

    /// Replaces the filters.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    /// Replaces the group-by labels.
    pub fn set_group_by(&mut self, group_by: Vec<String>) {
        self.group_by = group_by;
    }

    /// Toggles aggregation over time.
    pub fn set_agg_over_time(&mut self, agg_over_time: bool) {
        self.agg_over_time = agg_over_time;
    }

    /// Returns the selected metric.
    #[must_use]
    pub fn metric(&self) -> Option<&Metric> {
        self.metric.as_ref()
    }

    /// Returns the effective aggregation.
    #[must_use]
    pub fn aggregation(&self) -> Option<Aggregation> {
        self.aggregation
    }

    /// Returns the filters.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns the group-by labels.
    #[must_use]
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Returns whether aggregation over time is enabled.
    #[must_use]
    pub fn agg_over_time(&self) -> bool {
        self.agg_over_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latency() -> Metric {
        Metric::new("request_latency_seconds", MetricKind::Distribution)
            .with_label("route")
            .with_label("status")
    }

    fn queue_depth() -> Metric {
        Metric::new("queue_depth", MetricKind::Values).with_label("queue")
    }

    #[test]
    fn test_allowed_tables() {
        assert!(is_allowed(MetricKind::Events, Aggregation::Rate));
        assert!(is_allowed(MetricKind::Values, Aggregation::Max));
        assert!(is_allowed(MetricKind::Distribution, Aggregation::P50));
        assert!(!is_allowed(MetricKind::Values, Aggregation::P95));
        assert!(!is_allowed(MetricKind::Distribution, Aggregation::Avg));
        assert!(!is_allowed(MetricKind::Events, Aggregation::Min));
    }

    #[test]
    fn test_defaults_are_allowed() {
        for kind in [MetricKind::Events, MetricKind::Values, MetricKind::Distribution] {
            assert!(is_allowed(kind, default_aggregation(kind)));
        }
        assert_eq!(default_aggregation(MetricKind::Values), Aggregation::Avg);
        assert_eq!(default_aggregation(MetricKind::Distribution), Aggregation::P95);
        assert_eq!(default_aggregation(MetricKind::Events), Aggregation::Sum);
    }

    #[test]
    fn test_reconcile() {
        assert_eq!(
            reconcile_aggregation(MetricKind::Values, Some(Aggregation::Max)),
            Aggregation::Max
        );
        assert_eq!(
            reconcile_aggregation(MetricKind::Values, Some(Aggregation::P95)),
            Aggregation::Avg
        );
        assert_eq!(
            reconcile_aggregation(MetricKind::Events, None),
            Aggregation::Sum
        );
    }

    #[test]
    fn test_switching_distribution_to_values_resets_p95() {
        let mut selection = MetricSelection::new();
        assert_eq!(selection.select_metric(latency()), Aggregation::P95);

        assert_eq!(selection.select_metric(queue_depth()), Aggregation::Avg);
        assert_eq!(selection.aggregation(), Some(Aggregation::Avg));
    }

    #[test]
    fn test_compatible_switch_keeps_choice() {
        let mut selection = MetricSelection::new();
        selection.select_metric(latency());
        selection.set_aggregation(Aggregation::P99).unwrap();

        let other = Metric::new("db_query_seconds", MetricKind::Distribution);
        assert_eq!(selection.select_metric(other), Aggregation::P99);
    }

    #[test]
    fn test_set_invalid_aggregation_is_refused() {
        let mut selection = MetricSelection::new();
        assert!(matches!(
            selection.set_aggregation(Aggregation::Avg),
            Err(PromQlError::NoMetricSelected)
        ));

        selection.select_metric(queue_depth());
        assert!(matches!(
            selection.set_aggregation(Aggregation::P90),
            Err(PromQlError::InvalidAggregation {
                kind: MetricKind::Values,
                aggregation: Aggregation::P90
            })
        ));
        assert_eq!(selection.aggregation(), Some(Aggregation::Avg));
    }

    #[test]
    fn test_select_metric_prunes_unknown_labels() {
        let mut selection = MetricSelection::new();
        selection.select_metric(latency());
        selection.set_filters(vec![
            Filter::equals("route", "/api"),
            Filter::equals("", ""),
            Filter::equals("queue", "emails"),
        ]);
        selection.set_group_by(vec!["status".to_string(), "queue".to_string()]);

        selection.select_metric(queue_depth());

        assert_eq!(selection.filters().len(), 2);
        assert_eq!(selection.filters()[1].label, "queue");
        assert_eq!(selection.group_by(), ["queue".to_string()]);
    }
}

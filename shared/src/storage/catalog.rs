//! Metric catalog trait and implementations.
//!
//! Provides the `MetricCatalog` trait for looking up the metrics a user can
//! chart, and an `InMemoryMetricCatalog` implementation that can be seeded
//! from a JSON document.

use super::StoreError;
use crate::models::{Metric, MetricKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// Query parameters for listing catalog metrics.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Filter by metric kind.
    pub kind: Option<MetricKind>,

    /// Case-insensitive substring match on key or display name.
    pub search: Option<String>,
}

impl CatalogQuery {
    /// Creates a new empty query (returns all metrics).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind filter.
    #[must_use]
    pub fn with_kind(mut self, kind: MetricKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the search filter.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn matches(&self, metric: &Metric) -> bool {
        if let Some(kind) = self.kind {
            if metric.kind != kind {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !metric.key.to_lowercase().contains(&needle)
                && !metric.display_as.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

/// Trait for metric catalog implementations.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait MetricCatalog: Send + Sync {
    /// Inserts or replaces a metric, keyed by `Metric::key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric is invalid or the store is unavailable.
    fn upsert(&self, metric: Metric) -> Result<(), StoreError>;

    /// Inserts or replaces several metrics. Nothing is stored if any is invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if any metric is invalid or the store is unavailable.
    fn upsert_batch(&self, metrics: Vec<Metric>) -> Result<(), StoreError>;

    /// Looks up a metric by key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no metric has the key.
    fn get(&self, key: &str) -> Result<Metric, StoreError>;

    /// Lists metrics matching the query, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list(&self, query: &CatalogQuery) -> Result<Vec<Metric>, StoreError>;

    /// Returns the sorted, de-duplicated label names of one metric or, when
    /// `metric_key` is `None`, of the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown metric key.
    fn labels(&self, metric_key: Option<&str>) -> Result<Vec<String>, StoreError>;

    /// Returns the number of metrics in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory metric catalog implementation.
#[derive(Debug, Default)]
pub struct InMemoryMetricCatalog {
    metrics: Arc<RwLock<BTreeMap<String, Metric>>>,
}

impl InMemoryMetricCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from a JSON array of metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a metric is invalid.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let metrics: Vec<Metric> =
            serde_json::from_str(json).map_err(|e| StoreError::Validation(e.to_string()))?;
        let catalog = Self::new();
        catalog.upsert_batch(metrics)?;
        Ok(catalog)
    }
}

impl MetricCatalog for InMemoryMetricCatalog {
    fn upsert(&self, metric: Metric) -> Result<(), StoreError> {
        self.upsert_batch(vec![metric])
    }

    fn upsert_batch(&self, new_metrics: Vec<Metric>) -> Result<(), StoreError> {
        for metric in &new_metrics {
            metric
                .validate_metric()
                .map_err(|e| StoreError::Validation(e.to_string()))?;
        }

        let mut metrics = self
            .metrics
            .write()
            .map_err(|_| StoreError::LockError("catalog"))?;
        for mut metric in new_metrics {
            if metric.display_as.trim().is_empty() {
                metric.display_as.clone_from(&metric.key);
            }
            metrics.insert(metric.key.clone(), metric);
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Metric, StoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| StoreError::LockError("catalog"))?;
        metrics
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("metric", key))
    }

    fn list(&self, query: &CatalogQuery) -> Result<Vec<Metric>, StoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| StoreError::LockError("catalog"))?;
        Ok(metrics
            .values()
            .filter(|m| query.matches(m))
            .cloned()
            .collect())
    }

    fn labels(&self, metric_key: Option<&str>) -> Result<Vec<String>, StoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| StoreError::LockError("catalog"))?;

        let labels: BTreeSet<&String> = match metric_key {
            Some(key) => metrics
                .get(key)
                .ok_or_else(|| StoreError::not_found("metric", key))?
                .labels
                .iter()
                .collect(),
            None => metrics.values().flat_map(|m| m.labels.iter()).collect(),
        };

        Ok(labels.into_iter().cloned().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| StoreError::LockError("catalog"))?;
        Ok(metrics.len())
    }
}

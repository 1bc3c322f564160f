//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use anyhow::{Context, Result};
use shared::storage::{
    CommentStore, EventStore, FlowStore, InMemoryCommentStore, InMemoryEventStore,
    InMemoryFlowStore, InMemoryMetricCatalog, InMemoryNotebookStore, InMemoryTenantStore,
    MetricCatalog, NotebookStore, TenantStore,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn MetricCatalog>,
    flow_store: Arc<dyn FlowStore>,
    event_store: Arc<dyn EventStore>,
    notebook_store: Arc<dyn NotebookStore>,
    comment_store: Arc<dyn CommentStore>,
    tenant_store: Arc<dyn TenantStore>,
}

impl AppState {
    /// Creates in-memory state with the given metric catalog.
    pub fn with_catalog(catalog: Arc<dyn MetricCatalog>) -> Self {
        Self {
            catalog,
            flow_store: Arc::new(InMemoryFlowStore::new()),
            event_store: Arc::new(InMemoryEventStore::new()),
            notebook_store: Arc::new(InMemoryNotebookStore::new()),
            comment_store: Arc::new(InMemoryCommentStore::new()),
            tenant_store: Arc::new(InMemoryTenantStore::new()),
        }
    }

    /// Creates a new application state with empty in-memory stores.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::with_catalog(Arc::new(InMemoryMetricCatalog::new()))
    }

    /// Creates state for a server, preloading the catalog file if one is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(path) = &config.catalog_path else {
            return Ok(Self::with_in_memory_store());
        };

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = InMemoryMetricCatalog::from_json(&json)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            metrics = catalog.count().unwrap_or(0),
            "Loaded metric catalog"
        );
        Ok(Self::with_catalog(Arc::new(catalog)))
    }

    /// Returns the metric catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn MetricCatalog {
        self.catalog.as_ref()
    }

    /// Returns the flow store.
    #[must_use]
    pub fn flow_store(&self) -> &dyn FlowStore {
        self.flow_store.as_ref()
    }

    /// Returns the event store.
    #[must_use]
    pub fn event_store(&self) -> &dyn EventStore {
        self.event_store.as_ref()
    }

    /// Returns the notebook store.
    #[must_use]
    pub fn notebook_store(&self) -> &dyn NotebookStore {
        self.notebook_store.as_ref()
    }

    /// Returns the comment store.
    #[must_use]
    pub fn comment_store(&self) -> &dyn CommentStore {
        self.comment_store.as_ref()
    }

    /// Returns the tenant store.
    #[must_use]
    pub fn tenant_store(&self) -> &dyn TenantStore {
        self.tenant_store.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Metric, MetricKind, Tenant};
    use std::io::Write;

    #[test]
    fn test_app_state_is_clone() {
        let state = AppState::with_in_memory_store();
        let state2 = state.clone();

        state.tenant_store().insert(Tenant::new("acme")).unwrap();
        state
            .catalog()
            .upsert(Metric::new("cpu_seconds", MetricKind::Values))
            .unwrap();

        assert_eq!(state2.tenant_store().list().unwrap().len(), 1);
        assert_eq!(state2.catalog().count().unwrap(), 1);
    }

    #[test]
    fn test_from_config_without_catalog() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert_eq!(state.catalog().count().unwrap(), 0);
    }

    #[test]
    fn test_from_config_loads_catalog() {
        let path = std::env::temp_dir().join(format!("flowdeck-catalog-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"key": "http_requests_total", "kind": "events", "labels": ["status"]}}]"#
        )
        .unwrap();

        let config = Config {
            catalog_path: Some(path.clone()),
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        std::fs::remove_file(&path).unwrap();

        let metric = state.catalog().get("http_requests_total").unwrap();
        assert_eq!(metric.kind, MetricKind::Events);
        assert_eq!(metric.display_as, "http_requests_total");
    }

    #[test]
    fn test_from_config_missing_file() {
        let config = Config {
            catalog_path: Some("/nonexistent/flowdeck/catalog.json".into()),
            ..Config::default()
        };
        assert!(AppState::from_config(&config).is_err());
    }
}

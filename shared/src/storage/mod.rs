//! Storage traits and implementations.
//!
//! Each dashboard resource has a trait defining its storage interface and an
//! in-memory implementation, so the API can run without a database and tests
//! can use fresh stores.

pub mod catalog;
pub mod comment_store;
pub mod event_store;
pub mod flow_store;
pub mod notebook_store;
pub mod tenant_store;

use thiserror::Error;

pub use catalog::{CatalogQuery, InMemoryMetricCatalog, MetricCatalog};
pub use comment_store::{CommentStore, InMemoryCommentStore};
pub use event_store::{EventQuery, EventStore, InMemoryEventStore};
pub use flow_store::{FlowQuery, FlowQueryResult, FlowStore, InMemoryFlowStore};
pub use notebook_store::{InMemoryNotebookStore, NotebookStore};
pub use tenant_store::{InMemoryTenantStore, TenantStore};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on {0} store")]
    LockError(&'static str),

    /// The requested record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind (e.g., "notebook").
        kind: &'static str,
        /// The id or key that was looked up.
        id: String,
    },

    /// A record with the same identity already exists.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// Record kind.
        kind: &'static str,
        /// The conflicting id or name.
        id: String,
    },

    /// The record failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl StoreError {
    /// Creates a `NotFound` error.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

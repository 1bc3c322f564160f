//! Notebook persistence.
//!
//! Editors produce a stream of small changes. Rather than writing each one,
//! changes are coalesced by a [`DebouncedSaver`] and handed to a
//! [`NotebookSink`] once editing pauses.

mod debounce;

pub use debounce::DebouncedSaver;

use crate::models::NotebookPatch;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned when a notebook change cannot be persisted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    /// The destination refused the change.
    #[error("Save rejected: {0}")]
    Rejected(String),

    /// The notebook no longer exists.
    #[error("Notebook not found: {0}")]
    NotFound(Uuid),

    /// The saver has shut down.
    #[error("Saver is closed")]
    Closed,
}

/// Destination for notebook changes.
///
/// Implemented by the in-memory store and by the HTTP client, so the same
/// saver works locally and against a remote API.
pub trait NotebookSink: Send + Sync + 'static {
    /// Persists a partial update to a notebook.
    fn save(
        &self,
        id: Uuid,
        patch: NotebookPatch,
    ) -> impl Future<Output = Result<(), PersistError>> + Send;
}

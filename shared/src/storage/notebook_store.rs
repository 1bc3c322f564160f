//! Notebook storage trait and implementations.
//!
//! Provides the `NotebookStore` trait and an `InMemoryNotebookStore`. The
//! in-memory store also acts as a [`NotebookSink`] so debounced editor
//! saves can be pointed straight at it.

use super::StoreError;
use crate::models::{Notebook, NotebookPatch};
use crate::persistence::{NotebookSink, PersistError};
use std::future::Future;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Trait for notebook storage implementations.
pub trait NotebookStore: Send + Sync {
    /// Stores a new notebook.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the id is taken, or a validation
    /// error for an invalid notebook.
    fn create(&self, notebook: Notebook) -> Result<Notebook, StoreError>;

    /// Looks up a notebook by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no notebook has the id.
    fn get(&self, id: Uuid) -> Result<Notebook, StoreError>;

    /// Lists notebooks, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list(&self, tenant_id: Option<Uuid>) -> Result<Vec<Notebook>, StoreError>;

    /// Applies a partial update and returns the updated notebook.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id, or a validation
    /// error if the result would be invalid (the stored notebook is left
    /// unchanged in that case).
    fn update(&self, id: Uuid, patch: NotebookPatch) -> Result<Notebook, StoreError>;

    /// Deletes a notebook.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// In-memory notebook store implementation.
#[derive(Debug, Default)]
pub struct InMemoryNotebookStore {
    notebooks: Arc<RwLock<Vec<Notebook>>>,
}

impl InMemoryNotebookStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotebookStore for InMemoryNotebookStore {
    fn create(&self, notebook: Notebook) -> Result<Notebook, StoreError> {
        notebook
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let mut notebooks = self
            .notebooks
            .write()
            .map_err(|_| StoreError::LockError("notebook"))?;
        if notebooks.iter().any(|n| n.id == notebook.id) {
            return Err(StoreError::AlreadyExists {
                kind: "notebook",
                id: notebook.id.to_string(),
            });
        }
        notebooks.push(notebook.clone());
        Ok(notebook)
    }

    fn get(&self, id: Uuid) -> Result<Notebook, StoreError> {
        let notebooks = self
            .notebooks
            .read()
            .map_err(|_| StoreError::LockError("notebook"))?;
        notebooks
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("notebook", id))
    }

    fn list(&self, tenant_id: Option<Uuid>) -> Result<Vec<Notebook>, StoreError> {
        let notebooks = self
            .notebooks
            .read()
            .map_err(|_| StoreError::LockError("notebook"))?;
        let mut listed: Vec<Notebook> = notebooks
            .iter()
            .filter(|n| tenant_id.is_none() || n.tenant_id == tenant_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listed)
    }

    fn update(&self, id: Uuid, patch: NotebookPatch) -> Result<Notebook, StoreError> {
        let mut notebooks = self
            .notebooks
            .write()
            .map_err(|_| StoreError::LockError("notebook"))?;
        let stored = notebooks
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::not_found("notebook", id))?;

        let mut updated = stored.clone();
        updated.apply(patch);
        updated
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        *stored = updated.clone();
        Ok(updated)
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut notebooks = self
            .notebooks
            .write()
            .map_err(|_| StoreError::LockError("notebook"))?;
        let before = notebooks.len();
        notebooks.retain(|n| n.id != id);
        if notebooks.len() == before {
            return Err(StoreError::not_found("notebook", id));
        }
        Ok(())
    }
}

impl NotebookSink for InMemoryNotebookStore {
    fn save(
        &self,
        id: Uuid,
        patch: NotebookPatch,
    ) -> impl Future<Output = Result<(), PersistError>> + Send {
        let result = self.update(id, patch).map(|_| ()).map_err(|e| match e {
            StoreError::NotFound { .. } => PersistError::NotFound(id),
            other => PersistError::Rejected(other.to_string()),
        });
        std::future::ready(result)
    }
}

//! Comment storage.

use super::StoreError;
use crate::models::Comment;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Trait for comment storage implementations.
pub trait CommentStore: Send + Sync {
    /// Inserts a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment is invalid or the store is unavailable.
    fn insert(&self, comment: Comment) -> Result<(), StoreError>;

    /// Lists comments on a notebook, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list_for_notebook(&self, notebook_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    /// Removes every comment on a notebook and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn delete_for_notebook(&self, notebook_id: Uuid) -> Result<usize, StoreError>;
}

/// In-memory comment store.
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: Arc<RwLock<Vec<Comment>>>,
}

impl InMemoryCommentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentStore for InMemoryCommentStore {
    fn insert(&self, comment: Comment) -> Result<(), StoreError> {
        comment
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut comments = self
            .comments
            .write()
            .map_err(|_| StoreError::LockError("comment"))?;
        comments.push(comment);
        Ok(())
    }

    fn list_for_notebook(&self, notebook_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let comments = self
            .comments
            .read()
            .map_err(|_| StoreError::LockError("comment"))?;
        let mut listed: Vec<Comment> = comments
            .iter()
            .filter(|c| c.notebook_id == notebook_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }

    fn delete_for_notebook(&self, notebook_id: Uuid) -> Result<usize, StoreError> {
        let mut comments = self
            .comments
            .write()
            .map_err(|_| StoreError::LockError("comment"))?;
        let before = comments.len();
        comments.retain(|c| c.notebook_id != notebook_id);
        Ok(before - comments.len())
    }
}

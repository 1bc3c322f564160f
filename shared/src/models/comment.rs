//! Notebook comment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A comment on a notebook, optionally anchored to one of its blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Comment {
    /// Unique identifier.
    pub id: Uuid,

    /// The notebook the comment belongs to.
    pub notebook_id: Uuid,

    /// The block the comment is anchored to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<Uuid>,

    /// Who wrote the comment.
    #[validate(length(min = 1, message = "Comment author cannot be empty"))]
    pub author: String,

    /// Comment text.
    #[validate(length(min = 1, max = 10000, message = "Comment body must be 1-10000 characters"))]
    pub body: String,

    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment on a notebook.
    #[must_use]
    pub fn new(notebook_id: Uuid, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            notebook_id,
            block_id: None,
            author: author.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    /// Anchors the comment to a block.
    #[must_use]
    pub fn on_block(mut self, block_id: Uuid) -> Self {
        self.block_id = Some(block_id);
        self
    }
}

//! Tenant model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tenant owning flows, events, and notebooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Tenant {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Tenant name must be 1-100 characters"))]
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Creates a tenant with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

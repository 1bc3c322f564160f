//! Timeline event (annotation) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// An annotation placed on the timeline, such as a deploy or an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Event {
    /// Unique identifier.
    pub id: Uuid,

    /// Owning tenant, if the event is tenant-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,

    /// Short title shown on the timeline marker.
    #[validate(length(min = 1, max = 200, message = "Event title must be 1-200 characters"))]
    pub title: String,

    /// Longer free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the event happened.
    pub timestamp: DateTime<Utc>,

    /// Labels used to filter the timeline.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Event {
    /// Creates an event timestamped now.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: None,
            title: title.into(),
            description: None,
            timestamp: Utc::now(),
            labels: HashMap::new(),
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Scopes the event to a tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

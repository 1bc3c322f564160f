//! Timeline event storage.

use super::StoreError;
use crate::models::Event;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for retrieving events.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Filter by tenant. Events without a tenant always match.
    pub tenant_id: Option<Uuid>,

    /// Events at or after this time.
    pub start_time: Option<DateTime<Utc>>,

    /// Events before this time.
    pub end_time: Option<DateTime<Utc>>,

    /// Labels that must all match.
    pub labels: HashMap<String, String>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Creates a new empty query (returns all events).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tenant filter.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Restricts the query to `[start, end)`.
    #[must_use]
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Adds a label filter.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, event: &Event) -> bool {
        if let (Some(wanted), Some(actual)) = (self.tenant_id, event.tenant_id) {
            if wanted != actual {
                return false;
            }
        }
        if self.start_time.is_some_and(|start| event.timestamp < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| event.timestamp >= end) {
            return false;
        }
        self.labels
            .iter()
            .all(|(k, v)| event.labels.get(k).is_some_and(|actual| actual == v))
    }
}

/// Trait for event storage implementations.
pub trait EventStore: Send + Sync {
    /// Inserts an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is invalid or the store is unavailable.
    fn insert(&self, event: Event) -> Result<(), StoreError>;

    /// Queries events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError>;

    /// Returns the number of stored events.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory event store.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn insert(&self, event: Event) -> Result<(), StoreError> {
        event
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut events = self.events.write().map_err(|_| StoreError::LockError("event"))?;
        events.push(event);
        Ok(())
    }

    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().map_err(|_| StoreError::LockError("event"))?;
        let mut matched: Vec<Event> = events.iter().filter(|e| query.matches(e)).cloned().collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit.unwrap_or(usize::MAX));
        Ok(matched)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let events = self.events.read().map_err(|_| StoreError::LockError("event"))?;
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_insert_rejects_empty_title() {
        let store = InMemoryEventStore::new();
        assert!(store.insert(Event::new("")).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_query_window_and_order() {
        let store = InMemoryEventStore::new();
        let now = Utc::now();
        store
            .insert(Event::new("old deploy").with_timestamp(now - Duration::days(2)))
            .unwrap();
        store
            .insert(Event::new("deploy").with_timestamp(now - Duration::hours(2)))
            .unwrap();
        store
            .insert(Event::new("incident").with_timestamp(now - Duration::hours(1)))
            .unwrap();

        let events = store
            .query(&EventQuery::new().between(now - Duration::hours(24), now))
            .unwrap();

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["incident", "deploy"]);
    }

    #[test]
    fn test_query_tenant_and_labels() {
        let store = InMemoryEventStore::new();
        let tenant = Uuid::new_v4();
        store.insert(Event::new("global")).unwrap();
        store
            .insert(Event::new("mine").with_tenant(tenant).with_label("kind", "deploy"))
            .unwrap();
        store
            .insert(Event::new("theirs").with_tenant(Uuid::new_v4()))
            .unwrap();

        let scoped = store.query(&EventQuery::new().with_tenant(tenant)).unwrap();
        assert_eq!(scoped.len(), 2);

        let deploys = store
            .query(&EventQuery::new().with_label("kind", "deploy"))
            .unwrap();
        assert_eq!(deploys.len(), 1);
        assert_eq!(deploys[0].title, "mine");

        let limited = store.query(&EventQuery::new().with_limit(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }
}

//! Flow storage trait and implementations.
//!
//! Provides the `FlowStore` trait for recording and paging through flow
//! executions, and an `InMemoryFlowStore` implementation for development
//! and testing.

use super::StoreError;
use crate::models::{Flow, FlowStatus};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Query parameters for retrieving flows.
#[derive(Debug, Clone, Default)]
pub struct FlowQuery {
    /// Filter by tenant.
    pub tenant_id: Option<Uuid>,

    /// Filter by status.
    pub status: Option<FlowStatus>,

    /// Filter by name (case-insensitive substring match).
    pub name_contains: Option<String>,

    /// Flows that started at or after this time.
    pub start_time: Option<DateTime<Utc>>,

    /// Flows that started before this time.
    pub end_time: Option<DateTime<Utc>>,

    /// Maximum number of flows to return.
    pub limit: Option<usize>,

    /// Number of flows to skip (for pagination).
    pub offset: Option<usize>,
}

impl FlowQuery {
    /// Creates a new empty query (returns all flows).
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

    /// Sets the status filter.
    #[must_use]
    pub fn with_status(mut self, status: FlowStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the name filter.
    #[must_use]
    pub fn with_name_contains(mut self, name: impl Into<String>) -> Self {
        self.name_contains = Some(name.into());
        self
    }

    /// Sets the start time filter.
    #[must_use]
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Sets the end time filter.
    #[must_use]
    pub fn with_end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset for pagination.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn matches(&self, flow: &Flow) -> bool {
        if self.tenant_id.is_some_and(|t| t != flow.tenant_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != flow.status) {
            return false;
        }
        if let Some(ref name) = self.name_contains {
            if !flow.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if self.start_time.is_some_and(|start| flow.start_time < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| flow.start_time >= end) {
            return false;
        }
        true
    }
}

/// Result of a flow query operation.
#[derive(Debug, Clone)]
pub struct FlowQueryResult {
    /// The flows on the requested page, newest first.
    pub flows: Vec<Flow>,

    /// Total count of matching flows (before limit/offset applied).
    pub total_count: usize,
}

/// Trait for flow storage implementations.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait FlowStore: Send + Sync {
    /// Records a flow, replacing any flow with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow is invalid or the store is unavailable.
    fn upsert(&self, flow: Flow) -> Result<(), StoreError>;

    /// Looks up a flow by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no flow has the id.
    fn get(&self, id: Uuid) -> Result<Flow, StoreError>;

    /// Queries flows, newest start first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn query(&self, query: &FlowQuery) -> Result<FlowQueryResult, StoreError>;

    /// Returns the total number of flows in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory flow store implementation.
#[derive(Debug, Default)]
pub struct InMemoryFlowStore {
    flows: Arc<RwLock<Vec<Flow>>>,
}

impl InMemoryFlowStore {
    /// Creates a new empty in-memory flow store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for InMemoryFlowStore {
    fn upsert(&self, flow: Flow) -> Result<(), StoreError> {
        flow.validate_flow()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let mut flows = self.flows.write().map_err(|_| StoreError::LockError("flow"))?;
        match flows.iter_mut().find(|f| f.id == flow.id) {
            Some(existing) => *existing = flow,
            None => flows.push(flow),
        }
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Flow, StoreError> {
        let flows = self.flows.read().map_err(|_| StoreError::LockError("flow"))?;
        flows
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("flow", id))
    }

    fn query(&self, query: &FlowQuery) -> Result<FlowQueryResult, StoreError> {
        let flows = self.flows.read().map_err(|_| StoreError::LockError("flow"))?;

        let mut filtered: Vec<Flow> = flows.iter().filter(|f| query.matches(f)).cloned().collect();
        filtered.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let total_count = filtered.len();
        let offset = query.offset.unwrap_or(0);
        let page: Vec<Flow> = filtered
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(FlowQueryResult {
            flows: page,
            total_count,
        })
    }

    fn count(&self) -> Result<usize, StoreError> {
        let flows = self.flows.read().map_err(|_| StoreError::LockError("flow"))?;
        Ok(flows.len())
    }
}

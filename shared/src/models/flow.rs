//! Flow execution model.
//!
//! A flow is a tracked workflow or job run. Flows are what the execution
//! history table lists and what the timeline plots next to annotations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Execution status of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    /// Still executing.
    #[default]
    Running,
    /// Finished without error.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Cancelled,
}

impl FlowStatus {
    /// Returns true once the flow can no longer change state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single flow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Flow {
    /// Unique identifier.
    pub id: Uuid,

    /// Tenant the flow belongs to.
    pub tenant_id: Uuid,

    /// Flow name (e.g., "nightly-export").
    #[validate(length(min = 1, message = "Flow name cannot be empty"))]
    pub name: String,

    /// Current status.
    #[serde(default)]
    pub status: FlowStatus,

    /// When the run started.
    pub start_time: DateTime<Utc>,

    /// When the run ended, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Free-form labels attached to the run.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Errors that can occur during flow validation.
#[derive(Debug, Error)]
pub enum FlowValidationError {
    /// The end time precedes the start time.
    #[error("Flow end time precedes its start time")]
    EndBeforeStart,

    /// A terminal status was given without an end time, or the reverse.
    #[error("Flow status '{0}' is inconsistent with its end time")]
    StatusMismatch(FlowStatus),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Flow {
    /// Creates a running flow that started now.
    #[must_use]
    pub fn new(tenant_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            status: FlowStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            labels: HashMap::new(),
        }
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Marks the flow finished with the given status.
    #[must_use]
    pub fn finished(mut self, status: FlowStatus, end_time: DateTime<Utc>) -> Self {
        self.status = status;
        self.end_time = Some(end_time);
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Returns the run duration, if the flow has ended.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Validates the flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the end precedes the start, or
    /// the status disagrees with the presence of an end time.
    pub fn validate_flow(&self) -> Result<(), FlowValidationError> {
        self.validate()?;

        match self.end_time {
            Some(end) if end < self.start_time => Err(FlowValidationError::EndBeforeStart),
            Some(_) if !self.status.is_terminal() => {
                Err(FlowValidationError::StatusMismatch(self.status))
            }
            None if self.status.is_terminal() => {
                Err(FlowValidationError::StatusMismatch(self.status))
            }
            _ => Ok(()),
        }
    }
}

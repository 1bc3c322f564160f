//! Flowdeck Shared Library
//!
//! This crate contains the types and logic shared by the Flowdeck API
//! server and command-line client.
//!
//! # Modules
//!
//! - [`models`] - Metric catalog, time windows, notebooks, flows, and events
//! - [`promql`] - PromQL generation and the aggregation validity gate
//! - [`storage`] - Storage traits and in-memory implementations
//! - [`persistence`] - Debounced notebook saving
//! - [`config`] - Client configuration
//!
//! # Example
//!
//! ```
//! use shared::models::{Aggregation, MetricKind};
//! use shared::promql::{default_aggregation, reconcile_aggregation};
//!
//! // Switching to a values metric drops a percentile aggregation.
//! let aggregation = reconcile_aggregation(MetricKind::Values, Some(Aggregation::P95));
//! assert_eq!(aggregation, Aggregation::Avg);
//! assert_eq!(default_aggregation(MetricKind::Distribution), Aggregation::P95);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod persistence;
pub mod promql;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use uuid;
pub use validator;

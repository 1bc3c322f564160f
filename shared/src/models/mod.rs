//! Data models for the Flowdeck dashboard.
//!
//! This module contains the metric catalog, query selection, and the
//! dashboard resources (tenants, flows, events, notebooks, comments).

pub mod comment;
pub mod event;
pub mod filter;
pub mod flow;
pub mod metric;
pub mod notebook;
pub mod tenant;
pub mod time_window;

pub use comment::Comment;
pub use event::Event;
pub use filter::{Filter, FilterOperator};
pub use flow::{Flow, FlowStatus, FlowValidationError};
pub use metric::{
    is_valid_label_name, is_valid_metric_name, Aggregation, Metric, MetricKind,
    MetricValidationError,
};
pub use notebook::{Block, BlockConfig, BlockConfigError, BlockKind, Notebook, NotebookPatch};
pub use tenant::Tenant;
pub use time_window::{RelativeRange, ResolvedWindow, TimeWindow, TimeWindowError};

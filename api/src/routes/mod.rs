//! API route definitions.
//!
//! This module organizes all HTTP routes for the Flowdeck API server.

mod catalog;
mod comments;
mod error;
mod events;
mod flows;
mod health;
mod notebooks;
mod promql;
mod tenants;
mod timeline;
mod window;

pub use catalog::catalog_routes;
pub use comments::comment_routes;
pub use error::ApiError;
pub use events::event_routes;
pub use flows::flow_routes;
pub use health::health_routes;
pub use notebooks::notebook_routes;
pub use promql::promql_routes;
pub use tenants::tenant_routes;
pub use timeline::timeline_routes;

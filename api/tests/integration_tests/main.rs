//! Integration tests for the Flowdeck API.
//!
//! These tests drive the full router through `tower::ServiceExt::oneshot`
//! with fresh in-memory stores per test.

mod catalog_tests;
mod common;
mod notebook_tests;
mod promql_tests;
mod timeline_tests;

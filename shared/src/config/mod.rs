//! Configuration module for Flowdeck clients.

pub mod client;

pub use client::ClientConfig;

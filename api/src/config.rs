//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `FLOWDECK_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `FLOWDECK_PORT`: The port to listen on (default: 8080)
/// - `FLOWDECK_CATALOG_PATH`: JSON file with metric definitions to preload (optional)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Metric catalog file loaded at startup.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `FLOWDECK_PORT` is set but cannot be parsed as a
    /// valid port number.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("FLOWDECK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("FLOWDECK_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("FLOWDECK_PORT must be a port number")?
            .unwrap_or(8080);

        let catalog_path = std::env::var("FLOWDECK_CATALOG_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            catalog_path,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            catalog_path: None,
        }
    }
}

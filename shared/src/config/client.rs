//! Client configuration for talking to a Flowdeck API.
//!
//! Holds the connection settings shared by every command of the CLI along
//! with the timing knobs for polling and debounced saves.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Default interval between label and tenant refreshes, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default quiet period before notebook edits are saved, in milliseconds.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

/// Connection and timing settings for API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Polling interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Save debounce in milliseconds.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_save_debounce_ms() -> u64 {
    DEFAULT_SAVE_DEBOUNCE_MS
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with default timings.
    ///
    /// A trailing slash is stripped so paths can be appended directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::ClientConfig;
    ///
    /// let config = ClientConfig::new("http://localhost:8080/");
    /// assert_eq!(config.url("/api/metrics"), "http://localhost:8080/api/metrics");
    /// assert_eq!(config.timeout().as_secs(), 180);
    /// ```
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
        }
    }

    /// Sets the bearer token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the polling interval. Zero is raised to one second.
    #[must_use]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs.max(1);
        self
    }

    /// Sets the save debounce.
    #[must_use]
    pub fn with_save_debounce_ms(mut self, ms: u64) -> Self {
        self.save_debounce_ms = ms;
        self
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Save debounce.
    #[must_use]
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.token, None);
        assert_eq!(config.timeout(), Duration::from_secs(180));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.save_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_blank_token_ignored() {
        assert_eq!(ClientConfig::default().with_token("  ").token, None);
        assert_eq!(
            ClientConfig::default().with_token("abc").token.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("https://flowdeck.example.com//");
        assert_eq!(
            config.url("api/labels"),
            "https://flowdeck.example.com/api/labels"
        );
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = ClientConfig::default().with_poll_interval_secs(0);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://api:9000"}"#).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.save_debounce_ms, DEFAULT_SAVE_DEBOUNCE_MS);
    }
}

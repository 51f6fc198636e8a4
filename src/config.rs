//! Configuration for bloomlink
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Filter service host
    pub host: String,

    /// Filter service port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds); `None` waits for the OS default
    pub connect_timeout_ms: Option<u64>,

    /// Per-request response deadline (milliseconds); `None` waits
    /// forever, which is how the wire protocol behaves
    pub response_timeout_ms: Option<u64>,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Disable Nagle's algorithm on the connection
    pub nodelay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1337,
            connect_timeout_ms: None,
            response_timeout_ms: None,
            nodelay: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Endpoint in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the filter service host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the filter service port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = Some(ms);
        self
    }

    /// Set the per-request response deadline (in milliseconds)
    ///
    /// When a deadline expires the request fails with
    /// [`BloomError::Timeout`](crate::BloomError::Timeout) and its slot
    /// is cleared; a late response is discarded if it arrives before the
    /// next command is sent.
    pub fn response_timeout_ms(mut self, ms: u64) -> Self {
        self.config.response_timeout_ms = Some(ms);
        self
    }

    /// Enable or disable Nagle's algorithm suppression
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

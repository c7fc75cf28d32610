//! HTTP transport configuration.
//!
//! Read from the `[http]` table of the gateway configuration file:
//!
//! ```toml
//! [http]
//! timeout_secs = 60
//! connect_timeout_secs = 10
//! pool_max_idle_per_host = 8
//! http_version = "auto"
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// Connection and timeout settings for [`HttpTransport`](super::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections kept per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Whole-request timeout in seconds (1-300).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds (1-60).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// HTTP version preference.
    #[serde(default)]
    pub http_version: HttpVersion,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            http_version: HttpVersion::default(),
        }
    }
}

impl HttpConfig {
    /// Checks that timeouts are within bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if `timeout_secs` is not in
    /// 1-300 or `connect_timeout_secs` is not in 1-60.
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(GatewayError::ConfigurationError(format!(
                "timeout_secs must be between 1 and 300, got {}",
                self.timeout_secs
            )));
        }
        if !(1..=60).contains(&self.connect_timeout_secs) {
            return Err(GatewayError::ConfigurationError(format!(
                "connect_timeout_secs must be between 1 and 60, got {}",
                self.connect_timeout_secs
            )));
        }
        Ok(())
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// HTTP version preference.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 only.
    Http2,
    /// Negotiate via ALPN.
    #[default]
    Auto,
}

const fn default_pool_max_idle() -> usize {
    8
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

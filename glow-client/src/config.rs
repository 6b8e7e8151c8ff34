//! Client configuration
//!
//! Base URL of the analysis backend and per-endpoint request timeouts.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Development backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Transport-level timeout for each endpoint
///
/// A request exceeding its timeout surfaces as
/// [`ClientError::RequestFailed`] and is treated like any other network
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    pub create: Duration,
    pub status: Duration,
    pub get: Duration,
    pub delete: Duration,
    pub list: Duration,
}

impl RequestTimeouts {
    /// Reads `GLOW_{CREATE,STATUS,GET,DELETE,LIST}_TIMEOUT_SECS`, falling back
    /// to the defaults for unset or unparseable values
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |var: &str, default: Duration| {
            lookup(var)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };
        Self {
            create: secs("GLOW_CREATE_TIMEOUT_SECS", defaults.create),
            status: secs("GLOW_STATUS_TIMEOUT_SECS", defaults.status),
            get: secs("GLOW_GET_TIMEOUT_SECS", defaults.get),
            delete: secs("GLOW_DELETE_TIMEOUT_SECS", defaults.delete),
            list: secs("GLOW_LIST_TIMEOUT_SECS", defaults.list),
        }
    }
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30),
            status: Duration::from_secs(10),
            get: Duration::from_secs(15),
            delete: Duration::from_secs(10),
            list: Duration::from_secs(15),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://api.example.com"), no trailing slash
    pub base_url: String,
    pub timeouts: RequestTimeouts,
}

impl ClientConfig {
    /// Creates a configuration with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: RequestTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: RequestTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - GLOW_API_URL (optional, default: http://localhost:3000)
    /// - GLOW_CREATE_TIMEOUT_SECS (optional, default: 30)
    /// - GLOW_STATUS_TIMEOUT_SECS (optional, default: 10)
    /// - GLOW_GET_TIMEOUT_SECS (optional, default: 15)
    /// - GLOW_DELETE_TIMEOUT_SECS (optional, default: 10)
    /// - GLOW_LIST_TIMEOUT_SECS (optional, default: 15)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("GLOW_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let config = Self::new(base_url).with_timeouts(RequestTimeouts::from_lookup(&lookup));
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        let t = &self.timeouts;
        if [t.create, t.status, t.get, t.delete, t.list]
            .iter()
            .any(Duration::is_zero)
        {
            return Err(ClientError::InvalidConfig(
                "request timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_var(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

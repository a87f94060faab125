//! Backend client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, without a trailing slash (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,
    /// Extra attempts after the first for transient failures
    pub max_retries: u32,
    /// Backoff unit; attempt n waits `retry_delay_ms * (n + 1)`
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 30_000,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl BackendConfig {
    /// Default settings against another base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Single attempt per request
    pub fn no_retry(mut self) -> Self {
        self.max_retries = 0;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

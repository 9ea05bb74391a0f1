use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotfetch_model::{ApiKey, DEFAULT_TIMEOUT_MS, TimeoutMs};

use crate::error::CoreError;

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatcherConfig {
    /// Credential passed to every remote call.
    pub api_key: ApiKey,
    /// Budget for each request before it is asked to cancel.
    pub timeout_ms: TimeoutMs,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl DispatcherConfig {
    /// Config with `api_key` and the default timeout.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Replace the timeout and return updated config.
    pub fn with_timeout_ms(mut self, timeout_ms: TimeoutMs) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// Rules:
    /// - `api_key` is not empty or whitespace-only;
    /// - `timeout_ms` is not zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_key.is_empty() {
            return Err(CoreError::Config("apiKey cannot be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(CoreError::Config("timeoutMs cannot be zero".into()));
        }
        Ok(())
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Validated `EnvFilter` directive string, e.g. `"info"` or `"slotfetch_core=debug,warn"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Parse and validate a filter expression.
    ///
    /// ```
    /// use slotfetch_observe::LoggerLevel;
    ///
    /// let level = LoggerLevel::new("slotfetch_core=trace,info").unwrap();
    /// assert_eq!(level.as_str(), "slotfetch_core=trace,info");
    /// assert!(LoggerLevel::new("").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter; the value was validated on construction.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LoggerError::InvalidLevel(raw));
        }
        EnvFilter::try_new(trimmed).map_err(|e| LoggerError::InvalidLevel(format!("{raw}: {e}")))?;
        Ok(Self(trimmed.to_string()))
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

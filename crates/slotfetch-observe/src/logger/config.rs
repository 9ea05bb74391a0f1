use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::logger::{
    error::LoggerResult,
    object::{LoggerFormat, LoggerLevel},
};

/// Environment variable holding a filter expression that overrides [`LoggerConfig::level`].
pub const LOG_ENV_VAR: &str = "SLOTFETCH_LOG";

/// Environment variable overriding [`LoggerConfig::format`].
const LOG_FORMAT_ENV_VAR: &str = "SLOTFETCH_LOG_FORMAT";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"slotfetch_core=trace,info"`).
    pub level: LoggerLevel,
    /// Include module/target names in log output.
    pub with_targets: bool,
    /// Colored output; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// `true` when color is enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }

    /// Apply `SLOTFETCH_LOG` / `SLOTFETCH_LOG_FORMAT` on top of this config.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        let level = std::env::var(LOG_ENV_VAR).ok();
        let format = std::env::var(LOG_FORMAT_ENV_VAR).ok();
        self.with_overrides(level.as_deref(), format.as_deref())
    }

    /// Replace level and/or format with the given raw values; blank values are ignored.
    pub fn with_overrides(mut self, level: Option<&str>, format: Option<&str>) -> LoggerResult<Self> {
        if let Some(level) = level.filter(|s| !s.trim().is_empty()) {
            self.level = level.parse()?;
        }
        if let Some(format) = format.filter(|s| !s.trim().is_empty()) {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}

mod config;
mod error;
mod log;
mod object;

pub use config::{LOG_ENV_VAR, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel};

/// Installs the global tracing subscriber described by `cfg`.
///
/// Must be called once, before the dispatcher starts emitting events;
/// a second call returns [`LoggerError::AlreadyInitialized`].
///
/// # Examples
/// ```rust
/// use slotfetch_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("Failed to initialize logger");
///
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Compact => log::logger_compact(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
    }
}

use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
};

/// Human readable output, one event per line.
pub fn logger_text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let fmt_layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_thread_names(true);

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(fmt_layer);
    init_subscriber(subscriber)
}

/// Abbreviated single-line output; span fields are appended to the event.
pub fn logger_compact(cfg: &LoggerConfig) -> LoggerResult<()> {
    let fmt_layer = fmt::layer()
        .compact()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets);

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(fmt_layer);
    init_subscriber(subscriber)
}

/// Structured JSON lines for log collectors.
pub fn logger_json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let fmt_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_current_span(true);

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(fmt_layer);
    init_subscriber(subscriber)
}

fn init_subscriber<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerFormat;

    #[test]
    fn second_initialization_is_rejected() {
        let config = LoggerConfig {
            format: LoggerFormat::Compact,
            use_color: false,
            ..Default::default()
        };

        // Only this test installs a global subscriber in this binary.
        let first = logger_compact(&config);
        assert!(first.is_ok());
        assert!(matches!(
            logger_json(&config),
            Err(LoggerError::AlreadyInitialized)
        ));
    }
}

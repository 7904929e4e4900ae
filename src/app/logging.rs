use super::config::{LogFormat, LogLevel};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Dependencies whose chatter is capped regardless of the configured level.
const QUIET_TARGETS: &[(&str, LogLevel)] = &[("tokio", LogLevel::Warn), ("runtime", LogLevel::Warn)];

/// Default level first, then per-target caps.
pub fn build_filter_string(default_level: LogLevel) -> String {
    let mut parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
    parts.push(default_level.as_str().to_string());
    for (target, level) in QUIET_TARGETS {
        parts.push(format!("{target}={}", level.as_str()));
    }
    parts.join(",")
}

/// Install the global subscriber. `RUST_LOG`, when set, overrides `level`.
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let filter = build_filter_string(level);
            EnvFilter::try_new(&filter).map_err(|source| LoggingError::Filter { filter, source })?
        }
    };

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init()?,
    }

    Ok(())
}

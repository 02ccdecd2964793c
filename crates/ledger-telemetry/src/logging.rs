//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON `fmt` layer. JSON lines carry:
//! - `timestamp`, `level`, `target`
//! - the span and event fields recorded by the notifier (`session_id`,
//!   `stream`, `pair`, `count`, `error`)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Marker that logging was installed by this process.
#[derive(Debug)]
pub struct LoggingGuard {
    pub(crate) service_name: String,
}

/// Build the level filter from config, preferring `RUST_LOG` when set.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::LoggingInit`] if a global subscriber is
/// already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = build_filter(config)?;

    let fmt_layer = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        service_name: config.service_name.clone(),
    })
}

//! # Ledger Telemetry
//!
//! Logging and metrics for the ledger change-notification engine.
//!
//! ## Components
//!
//! - Structured logs through `tracing-subscriber` (pretty or JSON)
//! - Prometheus metrics in a process-wide registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LN_SERVICE_NAME` | `ledger-notifier` | Service name in logs |
//! | `LN_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` wins when set) |
//! | `LN_JSON_LOGS` | `false` | JSON output |
//! | `LN_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    encode_metrics, register_metrics, ACTIVE_SESSIONS, CHANGE_BATCH_SIZE, DELIVERY_FAILURES,
    FILTER_ITEMS_TRACKED, NOTIFICATIONS_DELIVERED, NOTIFICATIONS_DROPPED, NOTIFICATIONS_SCHEDULED,
    RESOLUTION_ANOMALIES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let logging = init_logging(&config)?;
    Ok(TelemetryGuard { logging })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    logging: LoggingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.logging.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

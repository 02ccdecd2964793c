//! Telemetry configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

/// Configuration for logging and metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive string
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ledger-notifier".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LN_SERVICE_NAME`: Service name (default: ledger-notifier)
    /// - `LN_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LN_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `LN_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("LN_SERVICE_NAME")
                .unwrap_or_else(|_| "ledger-notifier".to_string()),

            log_level: env::var("LN_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("LN_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("LN_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Parse a boolean-ish environment value, falling back on anything unknown.
pub(crate) fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

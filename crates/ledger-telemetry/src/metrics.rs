//! Prometheus metrics for the change-notification engine.
//!
//! All metrics follow the naming convention: `ln_notifier_<metric>_<unit>`
//!
//! ## Labels
//!
//! - `stream`: `updates`, `market`, `pending_tx`, `block_applied`
//! - `reason`: `queue_full`, `pool_stopped`, `session_closed`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Batches handed to the delivery pool
    pub static ref NOTIFICATIONS_SCHEDULED: CounterVec = CounterVec::new(
        Opts::new("ln_notifier_notifications_scheduled_total", "Notification batches scheduled for delivery"),
        &["stream"]
    ).expect("metric creation failed");

    /// Batches whose callback returned successfully
    pub static ref NOTIFICATIONS_DELIVERED: CounterVec = CounterVec::new(
        Opts::new("ln_notifier_notifications_delivered_total", "Notification batches delivered to subscribers"),
        &["stream"]
    ).expect("metric creation failed");

    /// Batches never handed to a callback
    pub static ref NOTIFICATIONS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("ln_notifier_notifications_dropped_total", "Notification batches dropped before delivery"),
        &["stream", "reason"]
    ).expect("metric creation failed");

    /// Callback invocations that reported a transport error
    pub static ref DELIVERY_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ln_notifier_delivery_failures_total", "Subscriber callbacks that returned an error"),
        &["stream"]
    ).expect("metric creation failed");

    /// Changed ids that could not be resolved against the ledger
    pub static ref RESOLUTION_ANOMALIES: IntCounter = IntCounter::new(
        "ln_notifier_resolution_anomalies_total",
        "Object ids announced by the ledger that failed to resolve"
    ).expect("metric creation failed");

    /// Live subscriber sessions
    pub static ref ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "ln_notifier_active_sessions",
        "Number of open subscriber sessions"
    ).expect("metric creation failed");

    /// Items armed in session membership filters
    pub static ref FILTER_ITEMS_TRACKED: IntCounter = IntCounter::new(
        "ln_notifier_filter_items_tracked_total",
        "Items inserted into subscriber membership filters"
    ).expect("metric creation failed");

    /// Size of each change batch received from the ledger
    pub static ref CHANGE_BATCH_SIZE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ln_notifier_change_batch_size",
            "Number of object ids per ledger change signal"
        ).buckets(exponential_buckets(1.0, 2.0, 12).expect("valid bucket layout"))
    ).expect("metric creation failed");

    static ref REGISTRATION: Result<(), String> = register_all();
}

fn register_all() -> Result<(), String> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NOTIFICATIONS_SCHEDULED.clone()),
        Box::new(NOTIFICATIONS_DELIVERED.clone()),
        Box::new(NOTIFICATIONS_DROPPED.clone()),
        Box::new(DELIVERY_FAILURES.clone()),
        Box::new(RESOLUTION_ANOMALIES.clone()),
        Box::new(ACTIVE_SESSIONS.clone()),
        Box::new(FILTER_ITEMS_TRACKED.clone()),
        Box::new(CHANGE_BATCH_SIZE.clone()),
    ];

    for metric in metrics {
        REGISTRY.register(metric).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Register all metrics with the global registry.
///
/// Idempotent: the first call performs registration, later calls report
/// its outcome.
pub fn register_metrics() -> Result<(), TelemetryError> {
    REGISTRATION
        .clone()
        .map_err(TelemetryError::MetricsInit)
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    register_metrics()?;
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

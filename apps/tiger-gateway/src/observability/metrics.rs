//! Prometheus metrics for the gateway.
//!
//! # Example
//!
//! ```ignore
//! use tiger_gateway::config::MetricsSettings;
//! use tiger_gateway::observability::{init_metrics, record_heartbeat};
//!
//! init_metrics(&MetricsSettings::default())?;
//! record_heartbeat("TIGER");
//! ```

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsSettings;

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Start the Prometheus HTTP exporter, serving `/metrics`.
///
/// # Errors
///
/// Returns an error if the address is invalid or the exporter fails to start
/// (e.g., port already in use).
pub fn init_metrics(settings: &MetricsSettings) -> Result<(), MetricsError> {
    let addr: SocketAddr = settings
        .listen_addr
        .parse()
        .map_err(|e| MetricsError::Configuration(format!("{}: {e}", settings.listen_addr)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record the outcome of `send_order`.
///
/// * `outcome` - `accepted` or `rejected`
/// * `order_type` - platform order type
pub fn record_order_submission(gateway: &str, outcome: &str, order_type: &str) {
    counter!(
        "gateway_order_submissions_total",
        "gateway" => gateway.to_string(),
        "outcome" => outcome.to_string(),
        "order_type" => order_type.to_string()
    )
    .increment(1);
}

/// Record a cancel request (`requested`, `failed` or `unbound`).
pub fn record_cancel(gateway: &str, outcome: &str) {
    counter!(
        "gateway_cancels_total",
        "gateway" => gateway.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a derived fill.
pub fn record_trade(gateway: &str) {
    counter!("gateway_trades_total", "gateway" => gateway.to_string()).increment(1);
}

// ============================================================================
// Market Data Metrics
// ============================================================================

/// Record a quote.
///
/// * `source` - `poll` or `push`
/// * `emitted` - false when a redundant push was dropped
pub fn record_quote(gateway: &str, source: &str, emitted: bool) {
    counter!(
        "gateway_quotes_total",
        "gateway" => gateway.to_string(),
        "source" => source.to_string(),
        "emitted" => emitted.to_string()
    )
    .increment(1);
}

// ============================================================================
// Supervisor Metrics
// ============================================================================

/// Record a worker task outcome (`ok`, `error` or `panic`).
pub fn record_task(gateway: &str, task: &str, outcome: &str) {
    counter!(
        "gateway_tasks_total",
        "gateway" => gateway.to_string(),
        "task" => task.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a heartbeat.
pub fn record_heartbeat(gateway: &str) {
    counter!("gateway_heartbeats_total", "gateway" => gateway.to_string()).increment(1);
}

/// Update a sub-connection state gauge (1 = connected, 0 = down).
pub fn set_connection_state(gateway: &str, kind: &str, connected: bool) {
    gauge!(
        "gateway_connection_up",
        "gateway" => gateway.to_string(),
        "kind" => kind.to_string()
    )
    .set(if connected { 1.0 } else { 0.0 });
}

/// Update the task queue depth gauge.
pub fn set_queue_depth(gateway: &str, depth: usize) {
    gauge!("gateway_task_queue_depth", "gateway" => gateway.to_string()).set(depth as f64);
}

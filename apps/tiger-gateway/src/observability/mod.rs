//! Observability: Prometheus metrics for the gateway core.
//!
//! Recording functions are cheap no-ops until a recorder is installed,
//! either by [`init_metrics`] or by the embedding host.

mod metrics;

pub use self::metrics::{
    MetricsError, init_metrics, record_cancel, record_heartbeat, record_order_submission,
    record_quote, record_task, record_trade, set_connection_state, set_queue_depth,
};

// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Tiger Gateway - Rust Core Library
//!
//! Connects the trading platform's gateway contract to the Tiger Securities
//! client SDK.
//!
//! # Architecture
//!
//! - **Domain**: platform vocabulary (requests, records, events, identifiers)
//! - **Broker**: the opaque SDK contract, Tiger's native types and a
//!   scripted SDK for tests
//! - **Gateway**: the session supervisor, its single worker thread and the
//!   order and market data reconciliation it runs
//! - **Events**: outbound delivery to the host event bus
//!
//! # Threading
//!
//! Host calls only enqueue tasks. One worker thread per session performs
//! every broker call in FIFO order; SDK push callbacks are converted into
//! tasks on the same queue.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Tiger SDK boundary.
pub mod broker;

/// YAML configuration.
pub mod config;

/// Platform-side domain types.
pub mod domain;

/// Host-facing error types.
pub mod error;

/// Outbound event delivery.
pub mod events;

/// Session supervisor, worker and reconciliation.
pub mod gateway;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup for the binary.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use broker::{MockTigerSdk, SdkAvailability, TigerSdk};
pub use config::{Config, ConfigError, TigerSettings, load_config};
pub use domain::shared::{Exchange, InstrumentKey, LocalOrderId, Symbol};
pub use domain::trading::{
    CancelRequest, Direction, GatewayEvent, HistoryRequest, Interval, OrderRequest, OrderStatus,
    OrderType, SubscribeRequest,
};
pub use error::{ConnectError, TaskError};
pub use events::{BroadcastEventPublisher, EventPublisher, RecordingEventPublisher};
pub use gateway::{ConnectionStatus, SessionState, TigerGateway};

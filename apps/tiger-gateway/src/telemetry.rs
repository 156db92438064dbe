//! Tracing Setup
//!
//! Installs the global `tracing` subscriber for the gateway binary.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives; overrides `observability.logging.level`
//! - `observability.logging.format`: `json` (default) or `pretty`
//!
//! # Usage
//!
//! ```rust,ignore
//! use tiger_gateway::telemetry::init_telemetry;
//!
//! init_telemetry(&config.observability.logging)?;
//! ```
//!
//! Library users embedding the gateway install their own subscriber and
//! never call this.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Subscriber installation failure.
#[derive(Debug, Error)]
#[error("Failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = if config.format == "pretty" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_thread_names(true)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_thread_names(true)
            .json()
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .try_init()
    };

    result.map_err(|e| TelemetryError(e.to_string()))
}

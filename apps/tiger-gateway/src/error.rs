//! Gateway error types.
//!
//! Only [`ConnectError`] reaches the host. [`TaskError`] stays inside the
//! worker, where it is logged and published as a log event.

use thiserror::Error;

use crate::broker::BrokerError;
use crate::config::ConfigError;
use crate::gateway::{ConnectionKind, SessionState};

/// Why `connect` did not start a session.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Settings are incomplete or invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// No Tiger SDK binding in this process.
    #[error("Tiger SDK unavailable: {reason}")]
    SdkUnavailable {
        /// Why the SDK could not be loaded.
        reason: String,
    },

    /// A session is already live.
    #[error("Gateway already connected (state {state})")]
    AlreadyConnected {
        /// Current session state.
        state: SessionState,
    },

    /// The worker thread could not be started.
    #[error("Failed to spawn gateway worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Failure of one worker task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The sub-connection the task needs is down.
    #[error("{kind} connection unavailable")]
    NotConnected {
        /// Missing connection.
        kind: ConnectionKind,
    },

    /// A broker call failed.
    #[error("{operation} failed: {source}")]
    Broker {
        /// What was being done.
        operation: &'static str,
        /// SDK error.
        #[source]
        source: BrokerError,
    },

    /// The task panicked. The worker survives.
    #[error("Task {task} panicked: {message}")]
    Panicked {
        /// Task name.
        task: &'static str,
        /// Panic payload, if it was a string.
        message: String,
    },
}

impl TaskError {
    /// Wrap a broker error with the operation that produced it.
    #[must_use]
    pub const fn broker(operation: &'static str, source: BrokerError) -> Self {
        Self::Broker { operation, source }
    }
}

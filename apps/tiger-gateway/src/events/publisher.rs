//! Event Publisher Port
//!
//! Interface for delivering gateway events to the platform bus.

use parking_lot::Mutex;

use crate::domain::trading::{
    GatewayEvent, OrderRecord, PositionRecord, TickSnapshot, TradeRecord,
};

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// The bus is gone.
    #[error("Event bus closed: {message}")]
    Closed {
        /// Error description.
        message: String,
    },

    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed {
        /// Error description.
        message: String,
    },
}

/// Port for publishing gateway events.
///
/// Called from the worker thread and occasionally from host threads, so
/// implementations must not block for long.
pub trait EventPublisher: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: GatewayEvent) -> Result<(), EventPublishError>;
}

/// Publisher that drops every event.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl EventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: GatewayEvent) -> Result<(), EventPublishError> {
        Ok(())
    }
}

/// Publisher that keeps every event in memory, in publish order.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<GatewayEvent>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far.
    #[must_use]
    pub fn events(&self) -> Vec<GatewayEvent> {
        self.events.lock().clone()
    }

    /// Number of events so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Order snapshots so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Order(order) => Some(order.clone()),
                _ => None,
            })
            .collect()
    }

    /// Fills so far.
    #[must_use]
    pub fn trades(&self) -> Vec<TradeRecord> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Trade(trade) => Some(trade.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ticks so far.
    #[must_use]
    pub fn ticks(&self) -> Vec<TickSnapshot> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Tick(tick) => Some(tick.clone()),
                _ => None,
            })
            .collect()
    }

    /// Position updates so far.
    #[must_use]
    pub fn positions(&self) -> Vec<PositionRecord> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Position(position) => Some(position.clone()),
                _ => None,
            })
            .collect()
    }

    /// Log messages so far.
    #[must_use]
    pub fn logs(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GatewayEvent::Log(log) => Some(log.message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of events of one kind (see [`GatewayEvent::kind`]).
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: GatewayEvent) -> Result<(), EventPublishError> {
        self.events.lock().push(event);
        Ok(())
    }
}

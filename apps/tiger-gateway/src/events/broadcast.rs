//! Broadcast-channel adapter for the host event bus.

use tokio::sync::broadcast;

use super::publisher::{EventPublishError, EventPublisher};
use crate::domain::trading::GatewayEvent;

/// Fans gateway events out to any number of async subscribers.
///
/// Slow subscribers lag and lose the oldest events; the gateway never waits
/// on them.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<GatewayEvent>,
}

impl BroadcastEventPublisher {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Attach a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: GatewayEvent) -> Result<(), EventPublishError> {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers attached, dropping event");
        }
        Ok(())
    }
}

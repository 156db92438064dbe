//! Event emission shared by every gateway component.

use std::sync::Arc;

use crate::domain::trading::{GatewayEvent, LogRecord};
use crate::events::EventPublisher;

/// Publishes events on behalf of one gateway instance.
///
/// Log events are mirrored to `tracing` so operators see them even when no
/// platform UI is attached. Publish failures are logged, never returned.
#[derive(Clone)]
pub struct Emitter {
    gateway_name: Arc<str>,
    publisher: Arc<dyn EventPublisher>,
}

impl Emitter {
    /// Create an emitter.
    #[must_use]
    pub fn new(gateway_name: impl Into<Arc<str>>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            gateway_name: gateway_name.into(),
            publisher,
        }
    }

    /// Gateway instance name.
    #[must_use]
    pub fn gateway_name(&self) -> &str {
        &self.gateway_name
    }

    /// Publish an event.
    pub fn emit(&self, event: GatewayEvent) {
        let kind = event.kind();
        if let Err(e) = self.publisher.publish(event) {
            tracing::warn!(
                gateway = %self.gateway_name,
                event = kind,
                error = %e,
                "Failed to publish gateway event"
            );
        }
    }

    /// Publish an informational log event.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(gateway = %self.gateway_name, "{message}");
        self.emit(GatewayEvent::Log(LogRecord::new(&*self.gateway_name, message)));
    }

    /// Publish a log event describing a failure.
    pub fn log_failure(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(gateway = %self.gateway_name, "{message}");
        self.emit(GatewayEvent::Log(LogRecord::new(&*self.gateway_name, message)));
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("gateway_name", &self.gateway_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventPublisher;

    #[test]
    fn log_events_carry_gateway_name() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let emitter = Emitter::new("TIGER", recorder.clone());

        emitter.log("connected");
        emitter.log_failure("quote connection failed");

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        let GatewayEvent::Log(log) = &events[0] else {
            panic!("expected log event");
        };
        assert_eq!(log.gateway_name, "TIGER");
        assert_eq!(log.message, "connected");
        assert_eq!(recorder.logs()[1], "quote connection failed");
    }
}

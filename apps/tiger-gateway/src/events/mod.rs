//! Outbound event delivery.
//!
//! The gateway emits through the [`EventPublisher`] port; adapters decide
//! where events go.

mod broadcast;
mod publisher;

pub use broadcast::BroadcastEventPublisher;
pub use publisher::{
    EventPublishError, EventPublisher, NoOpEventPublisher, RecordingEventPublisher,
};

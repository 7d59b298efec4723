//! Channel-backed publisher: hands events to a bounded queue.
//!
//! `publish` never waits. A full or closed queue is reported as an error
//! so the caller can hand it to its failure observer.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::config::EventsConfig;
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Creates a publisher and the receiving end of a queue holding
/// `config.queue_capacity` events.
pub fn event_channel(
    config: &EventsConfig,
) -> (ChannelEventPublisher, mpsc::Receiver<EventEnvelope>) {
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    (ChannelEventPublisher { sender }, receiver)
}

#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<EventEnvelope>,
}

#[async_trait]
impl EventPublisher for ChannelEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(event) => DomainError::new(
                ErrorCode::Timeout,
                format!("Event queue full, dropped {}", event.event_type),
            )
            .with_detail("event_id", event.event_id.to_string()),
            TrySendError::Closed(event) => DomainError::new(
                ErrorCode::InternalError,
                format!("Event queue closed, dropped {}", event.event_type),
            )
            .with_detail("event_id", event.event_id.to_string()),
        })
    }
}

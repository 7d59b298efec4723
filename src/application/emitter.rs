//! Fire-and-forget event emission for command handlers.
//!
//! A command's write has already committed when its events go out, so an
//! emission failure is logged and handed to the `PublishFailureObserver`
//! instead of failing the command.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, DomainEvent, SerializableDomainEvent};
use crate::ports::{EventPublisher, LoggingFailureObserver, PublishFailureObserver};

#[derive(Clone)]
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
    observer: Arc<dyn PublishFailureObserver>,
}

impl EventEmitter {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        observer: Arc<dyn PublishFailureObserver>,
    ) -> Self {
        Self {
            publisher,
            observer,
        }
    }

    /// Emitter whose observer only logs.
    pub fn with_logging_observer(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::new(publisher, Arc::new(LoggingFailureObserver))
    }

    /// Publishes `event` stamped with the request context.
    ///
    /// Never fails; returns whether the publisher accepted the event.
    pub async fn emit<E>(&self, event: &E, metadata: &CommandMetadata) -> bool
    where
        E: SerializableDomainEvent,
    {
        let envelope = match event.to_envelope() {
            Ok(envelope) => metadata.stamp(envelope),
            Err(error) => {
                tracing::warn!(
                    event_type = event.event_type(),
                    event_id = %event.event_id(),
                    error = %error,
                    "failed to serialize event"
                );
                self.observer
                    .publish_failed(event.event_type(), &event.event_id(), &error);
                return false;
            }
        };

        match self.publisher.publish(envelope).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    event_type = event.event_type(),
                    event_id = %event.event_id(),
                    error = %error,
                    "event publish failed; write already committed"
                );
                self.observer
                    .publish_failed(event.event_type(), &event.event_id(), &error);
                false
            }
        }
    }
}

//! EventPublisher port - Interface for publishing domain events.
//!
//! The engine hands events to a publisher after its state change has been
//! committed. Delivery to clients is the publisher's concern.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope, EventId};

/// Port for publishing domain events.
///
/// A publish failure never undoes the state change that produced the
/// event; callers report it to a [`PublishFailureObserver`] and move on.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Stops at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

/// Receives events that could not be published.
///
/// Implementations should be cheap and must not block; they typically log
/// or bump a counter.
pub trait PublishFailureObserver: Send + Sync {
    fn publish_failed(&self, event_type: &str, event_id: &EventId, error: &DomainError);
}

/// Observer that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFailureObserver;

impl PublishFailureObserver for LoggingFailureObserver {
    fn publish_failed(&self, event_type: &str, event_id: &EventId, error: &DomainError) {
        tracing::error!(
            event_type = %event_type,
            event_id = %event_id,
            error = %error,
            "Event dropped after publish failure"
        );
    }
}

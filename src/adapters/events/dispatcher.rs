//! EventDispatcher - drains the event queue into a downstream publisher.
//!
//! Write paths only enqueue (see `ChannelEventPublisher`); this task does
//! the potentially slow delivery. Failures are reported to the observer
//! and the event is dropped.
//!
//! ## Graceful Shutdown
//!
//! On shutdown the dispatcher delivers whatever is already queued, then
//! stops.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::domain::foundation::EventEnvelope;
use crate::ports::{EventPublisher, PublishFailureObserver};

/// Delivery counters returned when the dispatcher stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: usize,
    pub failed: usize,
}

pub struct EventDispatcher {
    receiver: mpsc::Receiver<EventEnvelope>,
    downstream: Arc<dyn EventPublisher>,
    observer: Arc<dyn PublishFailureObserver>,
    stats: DispatchStats,
}

impl EventDispatcher {
    pub fn new(
        receiver: mpsc::Receiver<EventEnvelope>,
        downstream: Arc<dyn EventPublisher>,
        observer: Arc<dyn PublishFailureObserver>,
    ) -> Self {
        Self {
            receiver,
            downstream,
            observer,
            stats: DispatchStats::default(),
        }
    }

    /// Run until shutdown is signalled or every publisher handle is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> DispatchStats {
        tracing::info!("Event dispatcher started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        self.drain().await;
                        break;
                    }
                }

                next = self.receiver.recv() => {
                    match next {
                        Some(event) => self.deliver(event).await,
                        None => break,
                    }
                }
            }
        }

        tracing::info!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            "Event dispatcher stopped"
        );
        self.stats
    }

    async fn drain(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            self.deliver(event).await;
        }
    }

    async fn deliver(&mut self, event: EventEnvelope) {
        let event_type = event.event_type.clone();
        let event_id = event.event_id.clone();

        match self.downstream.publish(event).await {
            Ok(()) => {
                self.stats.delivered += 1;
                tracing::debug!(event_type = %event_type, event_id = %event_id, "Event delivered");
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(
                    event_type = %event_type,
                    event_id = %event_id,
                    error = %e,
                    "Event delivery failed"
                );
                self.observer.publish_failed(&event_type, &event_id, &e);
            }
        }
    }
}

//! ConsensusAuditLog - records every change to a locked consensus score.
//!
//! Subscribes to the consensus events and keeps an ordered trail of who
//! locked, overwrote or removed which values.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, EventEnvelope, ItemId, Timestamp,
};
use crate::domain::scoring::{ConsensusLocked, ConsensusUnlocked, LockedValues};
use crate::ports::{EventHandler, EventSubscriber};

const LOCKED: &str = "scoring.consensus_locked.v1";
const UNLOCKED: &str = "scoring.consensus_unlocked.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Locked,
    Overwritten { previous: LockedValues },
    Unlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub item_id: ItemId,
    pub actor: AttendeeId,
    pub action: AuditAction,
    /// Values in force after the change; the removed values for an unlock.
    pub values: LockedValues,
    pub at: Timestamp,
}

#[derive(Default)]
pub struct ConsensusAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl ConsensusAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log and registers it for both consensus events.
    pub fn attach(subscriber: &dyn EventSubscriber) -> Arc<Self> {
        let log = Arc::new(Self::new());
        subscriber.subscribe_all(&[LOCKED, UNLOCKED], log.clone());
        log
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn entries_for(&self, item_id: &ItemId) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| &e.item_id == item_id)
            .collect()
    }

    fn record(&self, entry: AuditEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

fn unreadable(event: &EventEnvelope, err: serde_json::Error) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("Unreadable {} payload: {}", event.event_type, err),
    )
}

#[async_trait]
impl EventHandler for ConsensusAuditLog {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let entry = match event.event_type.as_str() {
            LOCKED => {
                let locked: ConsensusLocked =
                    event.payload_as().map_err(|e| unreadable(&event, e))?;
                AuditEntry {
                    item_id: locked.item_id,
                    actor: locked.locked_by,
                    action: match locked.previous {
                        Some(previous) => AuditAction::Overwritten { previous },
                        None => AuditAction::Locked,
                    },
                    values: LockedValues {
                        s_value: locked.s_value,
                        s_complexity: locked.s_complexity,
                    },
                    at: locked.locked_at,
                }
            }
            UNLOCKED => {
                let unlocked: ConsensusUnlocked =
                    event.payload_as().map_err(|e| unreadable(&event, e))?;
                AuditEntry {
                    item_id: unlocked.item_id,
                    actor: unlocked.unlocked_by,
                    action: AuditAction::Unlocked,
                    values: unlocked.removed,
                    at: unlocked.unlocked_at,
                }
            }
            other => {
                tracing::debug!(event_type = %other, "audit log ignoring event");
                return Ok(());
            }
        };

        tracing::debug!(item_id = %entry.item_id, action = ?entry.action, "consensus audited");
        self.record(entry);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ConsensusAuditLog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::domain::foundation::{EventId, ProjectId};
    use crate::ports::EventPublisher;

    fn locked(item_id: ItemId, previous: Option<LockedValues>) -> EventEnvelope {
        EventEnvelope::from_event(&ConsensusLocked {
            event_id: EventId::new(),
            project_id: ProjectId::new(),
            item_id,
            s_value: 13,
            s_complexity: 5,
            locked_by: AttendeeId::new(),
            rationale: None,
            previous,
            locked_at: Timestamp::now(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn overwrite_keeps_previous_values() {
        let bus = InMemoryEventBus::new();
        let log = ConsensusAuditLog::attach(&bus);
        let item = ItemId::new();
        let previous = LockedValues {
            s_value: 8,
            s_complexity: 3,
        };

        bus.publish(locked(item, None)).await.unwrap();
        bus.publish(locked(item, Some(previous))).await.unwrap();

        let trail = log.entries_for(&item);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].action, AuditAction::Locked);
        assert_eq!(trail[1].action, AuditAction::Overwritten { previous });
        assert_eq!(trail[1].values.s_value, 13);
    }

    #[tokio::test]
    async fn unrelated_events_are_not_delivered() {
        let bus = InMemoryEventBus::new();
        let log = ConsensusAuditLog::attach(&bus);

        bus.publish(EventEnvelope::test_fixture()).await.unwrap();

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let log = ConsensusAuditLog::new();
        let event = EventEnvelope::new(LOCKED, "x", "ConsensusScore", serde_json::json!({}));

        let result = log.handle(event).await;

        assert_eq!(result.unwrap_err().code, ErrorCode::InternalError);
    }
}

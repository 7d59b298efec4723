//! UnlockConsensusHandler - Facilitator removes an item's locked consensus.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{CommandMetadata, EventId, ItemId, Timestamp};
use crate::domain::scoring::{ConsensusUnlocked, ScoringError};
use crate::ports::ConsensusScoreRepository;

use super::lock_consensus::conflict_or;

#[derive(Debug, Clone)]
pub struct UnlockConsensusCommand {
    pub item_id: ItemId,
}

pub struct UnlockConsensusHandler {
    consensus: Arc<dyn ConsensusScoreRepository>,
    emitter: EventEmitter,
}

impl UnlockConsensusHandler {
    pub fn new(consensus: Arc<dyn ConsensusScoreRepository>, emitter: EventEmitter) -> Self {
        Self { consensus, emitter }
    }

    pub async fn handle(
        &self,
        cmd: UnlockConsensusCommand,
        metadata: CommandMetadata,
    ) -> Result<ConsensusUnlocked, ScoringError> {
        metadata.auth.require_facilitator("unlock consensus scores")?;

        let existing = self
            .consensus
            .find(&cmd.item_id)
            .await?
            .filter(|c| c.project_id() == &metadata.project_id())
            .ok_or(ScoringError::ConsensusNotFound(cmd.item_id))?;

        self.consensus
            .delete(&cmd.item_id, existing.version())
            .await
            .map_err(|e| conflict_or(e, cmd.item_id))?;

        tracing::info!(item_id = %cmd.item_id, "consensus unlocked");

        let event = ConsensusUnlocked {
            event_id: EventId::new(),
            project_id: *existing.project_id(),
            item_id: cmd.item_id,
            unlocked_by: metadata.attendee_id(),
            removed: existing.values(),
            unlocked_at: Timestamp::now(),
        };
        self.emitter.emit(&event, &metadata).await;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConsensusStore;
    use crate::application::handlers::test_support::Workshop;
    use crate::domain::foundation::ScoreValue;
    use crate::domain::scoring::ConsensusScore;

    async fn locked(workshop: &Workshop) -> Arc<InMemoryConsensusStore> {
        let store = Arc::new(InMemoryConsensusStore::new());
        store
            .put(ConsensusScore::lock(
                workshop.project_id,
                workshop.item(0),
                ScoreValue::try_from_i64(8).unwrap(),
                ScoreValue::try_from_i64(3).unwrap(),
                workshop.facilitator,
                None,
            ))
            .await;
        store
    }

    #[tokio::test]
    async fn facilitator_unlocks_consensus() {
        let workshop = Workshop::new(&["A"], 1).await;
        let store = locked(&workshop).await;
        let handler = UnlockConsensusHandler::new(store.clone(), workshop.emitter());

        let event = handler
            .handle(
                UnlockConsensusCommand {
                    item_id: workshop.item(0),
                },
                workshop.facilitator_metadata(),
            )
            .await
            .unwrap();

        assert_eq!(event.removed.s_value, 8);
        assert!(store.find(&workshop.item(0)).await.unwrap().is_none());
        assert!(workshop.bus.has_event("scoring.consensus_unlocked.v1"));
    }

    #[tokio::test]
    async fn member_cannot_unlock() {
        let workshop = Workshop::new(&["A"], 1).await;
        let store = locked(&workshop).await;
        let handler = UnlockConsensusHandler::new(store.clone(), workshop.emitter());

        let result = handler
            .handle(
                UnlockConsensusCommand {
                    item_id: workshop.item(0),
                },
                workshop.metadata_for(workshop.members[0]),
            )
            .await;

        assert!(matches!(result, Err(ScoringError::FacilitatorRequired(_))));
        assert!(store.find(&workshop.item(0)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unlocking_unlocked_item_is_not_found() {
        let workshop = Workshop::new(&["A", "B"], 0).await;
        let store = locked(&workshop).await;
        let handler = UnlockConsensusHandler::new(store, workshop.emitter());

        let result = handler
            .handle(
                UnlockConsensusCommand {
                    item_id: workshop.item(1),
                },
                workshop.facilitator_metadata(),
            )
            .await;

        assert!(matches!(result, Err(ScoringError::ConsensusNotFound(_))));
    }
}

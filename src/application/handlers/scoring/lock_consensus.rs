//! LockConsensusHandler - Facilitator locks (or overwrites) an item's agreed scores.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventId, ItemId, ScoreValue,
};
use crate::domain::scoring::{
    normalize_rationale, ConsensusLocked, ConsensusScore, LockedValues, ScoringError,
};
use crate::ports::{ConsensusScoreRepository, WorkshopRegistry};

#[derive(Debug, Clone)]
pub struct LockConsensusCommand {
    pub item_id: ItemId,
    pub s_value: f64,
    pub s_complexity: f64,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LockConsensusResult {
    pub consensus: ConsensusScore,
    /// Values replaced by this lock, if the item was already locked.
    pub previous: Option<LockedValues>,
    pub event: ConsensusLocked,
}

pub struct LockConsensusHandler {
    consensus: Arc<dyn ConsensusScoreRepository>,
    registry: Arc<dyn WorkshopRegistry>,
    emitter: EventEmitter,
}

impl LockConsensusHandler {
    pub fn new(
        consensus: Arc<dyn ConsensusScoreRepository>,
        registry: Arc<dyn WorkshopRegistry>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            consensus,
            registry,
            emitter,
        }
    }

    pub async fn handle(
        &self,
        cmd: LockConsensusCommand,
        metadata: CommandMetadata,
    ) -> Result<LockConsensusResult, ScoringError> {
        metadata.auth.require_facilitator("lock consensus scores")?;

        let s_value = ScoreValue::try_from_f64(cmd.s_value).map_err(ScoringError::invalid_score)?;
        let s_complexity =
            ScoreValue::try_from_f64(cmd.s_complexity).map_err(ScoringError::invalid_score)?;
        let rationale = normalize_rationale(cmd.rationale)?;

        let project_id = metadata.project_id();
        let facilitator = metadata.attendee_id();
        let known = self
            .registry
            .roster(&project_id)
            .await?
            .is_some_and(|roster| roster.item(&cmd.item_id).is_some());
        if !known {
            return Err(ScoringError::ItemNotFound(cmd.item_id));
        }

        // Serialized per item by the version compare-and-set
        let (consensus, previous) = match self.consensus.find(&cmd.item_id).await? {
            None => {
                let consensus = ConsensusScore::lock(
                    project_id,
                    cmd.item_id,
                    s_value,
                    s_complexity,
                    facilitator,
                    rationale,
                );
                self.consensus
                    .insert(&consensus)
                    .await
                    .map_err(|e| conflict_or(e, cmd.item_id))?;
                (consensus, None)
            }
            Some(mut consensus) => {
                let expected_version = consensus.version();
                let previous = consensus.relock(s_value, s_complexity, facilitator, rationale);
                self.consensus
                    .update(&consensus, expected_version)
                    .await
                    .map_err(|e| conflict_or(e, cmd.item_id))?;
                (consensus, Some(previous))
            }
        };

        tracing::info!(
            item_id = %cmd.item_id,
            s_value = consensus.s_value(),
            s_complexity = consensus.s_complexity(),
            overwrite = previous.is_some(),
            "consensus locked"
        );

        let event = ConsensusLocked {
            event_id: EventId::new(),
            project_id,
            item_id: cmd.item_id,
            s_value: consensus.s_value(),
            s_complexity: consensus.s_complexity(),
            locked_by: facilitator,
            rationale: consensus.rationale().map(str::to_string),
            previous,
            locked_at: *consensus.locked_at(),
        };
        self.emitter.emit(&event, &metadata).await;

        Ok(LockConsensusResult {
            consensus,
            previous,
            event,
        })
    }
}

/// Maps persistence errors for consensus writes on `item_id`.
pub(super) fn conflict_or(err: DomainError, item_id: ItemId) -> ScoringError {
    match err.code {
        ErrorCode::ConcurrencyConflict => ScoringError::ConcurrencyConflict(item_id),
        ErrorCode::ConsensusNotFound => ScoringError::ConsensusNotFound(item_id),
        _ => err.into(),
    }
}

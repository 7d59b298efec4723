//! StartSessionHandler - Command handler for scheduling a comparison session.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{CommandMetadata, Criterion, ErrorCode, EventId, ItemId};
use crate::domain::pairwise::{
    schedule, Comparison, ComparisonSessionStarted, ComparisonSet, ConsensusRule, PairwiseError,
    Schedule,
};
use crate::ports::{ComparisonSetRepository, WorkshopRegistry};

/// Command to start a pairwise session over `item_ids` for one criterion.
///
/// Pairs are generated in the order the items are given.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub criterion: Criterion,
    pub item_ids: Vec<ItemId>,
}

#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub set: ComparisonSet,
    pub comparisons: Vec<Comparison>,
    pub event: ComparisonSessionStarted,
}

pub struct StartSessionHandler {
    sets: Arc<dyn ComparisonSetRepository>,
    registry: Arc<dyn WorkshopRegistry>,
    emitter: EventEmitter,
    rule: ConsensusRule,
}

impl StartSessionHandler {
    pub fn new(
        sets: Arc<dyn ComparisonSetRepository>,
        registry: Arc<dyn WorkshopRegistry>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            sets,
            registry,
            emitter,
            rule: ConsensusRule::default(),
        }
    }

    /// Builder: resolve comparisons with `rule` instead of unanimity.
    pub fn with_rule(mut self, rule: ConsensusRule) -> Self {
        self.rule = rule;
        self
    }

    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<StartSessionResult, PairwiseError> {
        metadata.auth.require_facilitator("start a comparison session")?;
        let project_id = metadata.project_id();

        // 1. Items and voters come from the registry
        let roster = self
            .registry
            .roster(&project_id)
            .await?
            .ok_or(PairwiseError::ProjectNotFound(project_id))?;

        if let Some(unknown) = cmd.item_ids.iter().find(|id| roster.item(id).is_none()) {
            return Err(PairwiseError::ItemNotFound(*unknown));
        }

        // 2. Build set and comparisons
        let Schedule { set, comparisons } = schedule(
            project_id,
            cmd.criterion,
            &cmd.item_ids,
            roster.attendee_ids(),
            self.rule,
        )?;

        // 3. Persist; the store enforces one active set per criterion
        if self
            .sets
            .find_active(&project_id, cmd.criterion)
            .await?
            .is_some()
        {
            return Err(PairwiseError::ActiveSessionExists {
                criterion: cmd.criterion,
            });
        }

        self.sets
            .create(&set, &comparisons)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ActiveSessionExists => PairwiseError::ActiveSessionExists {
                    criterion: cmd.criterion,
                },
                _ => e.into(),
            })?;

        tracing::info!(
            set_id = %set.id(),
            project_id = %project_id,
            criterion = %cmd.criterion,
            comparisons = comparisons.len(),
            "comparison session started"
        );

        // 4. Announce
        let event = ComparisonSessionStarted {
            event_id: EventId::new(),
            set_id: *set.id(),
            project_id,
            criterion: cmd.criterion,
            item_ids: set.item_ids().to_vec(),
            comparison_count: comparisons.len(),
            expected_voter_count: set.expected_voters().len(),
            quorum_percent: set.rule().quorum_percent(),
            started_at: *set.created_at(),
        };
        self.emitter.emit(&event, &metadata).await;

        Ok(StartSessionResult {
            set,
            comparisons,
            event,
        })
    }
}

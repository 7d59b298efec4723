//! CalculateRankingHandler - Recomputes and replaces a project's ranking.
//!
//! Inputs are the latest comparison set per criterion (whatever its status)
//! and the locked consensus scores. Any defective input fails the whole
//! calculation and leaves the stored ranking as it was.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{CommandMetadata, Criterion, ItemId, ProjectId};
use crate::domain::pairwise::win_weight;
use crate::domain::ranking::{calculate, RankingCalculated, RankingError, RankingInput, RankingSet};
use crate::ports::{
    ComparisonSetRepository, ConsensusScoreRepository, RankingRepository, WinTallyReader,
    WorkshopRegistry,
};

#[derive(Debug, Clone, Default)]
pub struct CalculateRankingCommand;

#[derive(Debug, Clone)]
pub struct CalculateRankingResult {
    pub ranking: RankingSet,
    pub event: RankingCalculated,
}

pub struct CalculateRankingHandler {
    sets: Arc<dyn ComparisonSetRepository>,
    tallies: Arc<dyn WinTallyReader>,
    consensus: Arc<dyn ConsensusScoreRepository>,
    rankings: Arc<dyn RankingRepository>,
    registry: Arc<dyn WorkshopRegistry>,
    emitter: EventEmitter,
}

impl CalculateRankingHandler {
    pub fn new(
        sets: Arc<dyn ComparisonSetRepository>,
        tallies: Arc<dyn WinTallyReader>,
        consensus: Arc<dyn ConsensusScoreRepository>,
        rankings: Arc<dyn RankingRepository>,
        registry: Arc<dyn WorkshopRegistry>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            sets,
            tallies,
            consensus,
            rankings,
            registry,
            emitter,
        }
    }

    pub async fn handle(
        &self,
        _cmd: CalculateRankingCommand,
        metadata: CommandMetadata,
    ) -> Result<CalculateRankingResult, RankingError> {
        let project_id = metadata.project_id();
        let calculated_by = metadata.attendee_id();

        let roster = self
            .registry
            .roster(&project_id)
            .await?
            .ok_or(RankingError::NoItems)?;
        if !roster.has_attendee(&calculated_by) {
            return Err(RankingError::Forbidden(format!(
                "Attendee {} is not part of this project",
                calculated_by
            )));
        }
        if roster.items.is_empty() {
            return Err(RankingError::NoItems);
        }

        let value_weights = self.weights(&project_id, Criterion::Value).await?;
        let complexity_weights = self.weights(&project_id, Criterion::Complexity).await?;
        let locked: HashMap<ItemId, _> = self
            .consensus
            .list_by_project(&project_id)
            .await?
            .into_iter()
            .map(|c| (*c.item_id(), c.values()))
            .collect();

        let inputs: Vec<RankingInput> = roster
            .items
            .iter()
            .map(|item| RankingInput {
                item_id: item.id,
                item_name: item.name.clone(),
                consensus: locked.get(&item.id).copied(),
                win_weight_value: value_weights.get(&item.id).copied().unwrap_or(0.0),
                win_weight_complexity: complexity_weights.get(&item.id).copied().unwrap_or(0.0),
            })
            .collect();

        let results = calculate(&inputs).map_err(|err| {
            tracing::warn!(
                project_id = %project_id,
                error = %err,
                "ranking calculation rejected, keeping previous ranking"
            );
            err
        })?;

        let ranking = RankingSet::new(project_id, results, calculated_by);
        self.rankings.replace(&ranking).await?;

        tracing::info!(
            project_id = %project_id,
            items = ranking.results.len(),
            leader = ?ranking.leader().map(|r| r.item_id.to_string()),
            "ranking calculated"
        );

        let event = RankingCalculated::from_set(&ranking);
        self.emitter.emit(&event, &metadata).await;

        Ok(CalculateRankingResult { ranking, event })
    }

    /// Win-weight per item from the latest set of `criterion`.
    async fn weights(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<HashMap<ItemId, f64>, RankingError> {
        let set = self
            .sets
            .find_latest(project_id, criterion)
            .await?
            .ok_or(RankingError::MissingComparisons(criterion))?;
        let tallies = self.tallies.tallies(set.id()).await?;

        Ok(win_weight::compute_weights(set.item_ids(), &tallies)
            .into_iter()
            .map(|w| (w.item_id, w.weight))
            .collect())
    }
}

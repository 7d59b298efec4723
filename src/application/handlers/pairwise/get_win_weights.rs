//! GetWinWeightsHandler - Query handler for per-item win-weights of a criterion.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{ComparisonSetId, Criterion, ItemId, ProjectId};
use crate::domain::pairwise::{win_weight, ComparisonSetStatus, ItemWinWeight, PairwiseError};
use crate::ports::{ComparisonSetRepository, WinTallyReader};

#[derive(Debug, Clone)]
pub struct GetWinWeightsQuery {
    pub project_id: ProjectId,
    pub criterion: Criterion,
}

/// Win-weights from the latest set of a criterion.
///
/// While the set is Active the weights are provisional: unresolved
/// comparisons count as zero credit.
#[derive(Debug, Clone, Serialize)]
pub struct WinWeightsView {
    pub set_id: ComparisonSetId,
    pub criterion: Criterion,
    pub status: ComparisonSetStatus,
    pub weights: Vec<ItemWinWeight>,
}

impl WinWeightsView {
    pub fn weight_of(&self, item_id: &ItemId) -> Option<f64> {
        self.weights
            .iter()
            .find(|w| &w.item_id == item_id)
            .map(|w| w.weight)
    }
}

pub struct GetWinWeightsHandler {
    sets: Arc<dyn ComparisonSetRepository>,
    tallies: Arc<dyn WinTallyReader>,
}

impl GetWinWeightsHandler {
    pub fn new(sets: Arc<dyn ComparisonSetRepository>, tallies: Arc<dyn WinTallyReader>) -> Self {
        Self { sets, tallies }
    }

    /// Returns `None` when no session was ever started for the criterion.
    pub async fn handle(
        &self,
        query: GetWinWeightsQuery,
    ) -> Result<Option<WinWeightsView>, PairwiseError> {
        let Some(set) = self
            .sets
            .find_latest(&query.project_id, query.criterion)
            .await?
        else {
            return Ok(None);
        };

        let tallies = self.tallies.tallies(set.id()).await?;

        Ok(Some(WinWeightsView {
            set_id: *set.id(),
            criterion: set.criterion(),
            status: set.status(),
            weights: win_weight::compute_weights(set.item_ids(), &tallies),
        }))
    }
}

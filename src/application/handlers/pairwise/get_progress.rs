//! GetComparisonProgressHandler - Query handler for a set's voting progress.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{AttendeeId, ComparisonId, ComparisonSetId, ProjectId};
use crate::domain::pairwise::{Comparison, ComparisonSet, PairwiseError};
use crate::ports::ComparisonSetRepository;

#[derive(Debug, Clone)]
pub struct GetComparisonProgressQuery {
    pub project_id: ProjectId,
    pub set_id: ComparisonSetId,
}

/// Voting state of one open comparison.
#[derive(Debug, Clone, Serialize)]
pub struct OpenComparison {
    pub comparison_id: ComparisonId,
    pub votes_cast: usize,
    /// Expected voters with no live vote yet.
    pub waiting_on: Vec<AttendeeId>,
}

#[derive(Debug, Clone)]
pub struct ComparisonProgress {
    pub set: ComparisonSet,
    pub total: usize,
    pub resolved: usize,
    pub open: Vec<OpenComparison>,
}

impl ComparisonProgress {
    fn from_parts(set: ComparisonSet, comparisons: &[Comparison]) -> Self {
        let open: Vec<OpenComparison> = comparisons
            .iter()
            .filter(|c| !c.consensus_reached())
            .map(|c| OpenComparison {
                comparison_id: *c.id(),
                votes_cast: c.votes().len(),
                waiting_on: set
                    .expected_voters()
                    .iter()
                    .filter(|voter| c.vote_of(voter).is_none())
                    .copied()
                    .collect(),
            })
            .collect();

        Self {
            total: comparisons.len(),
            resolved: comparisons.len() - open.len(),
            open,
            set,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.open.is_empty()
    }
}

pub struct GetComparisonProgressHandler {
    sets: Arc<dyn ComparisonSetRepository>,
}

impl GetComparisonProgressHandler {
    pub fn new(sets: Arc<dyn ComparisonSetRepository>) -> Self {
        Self { sets }
    }

    pub async fn handle(
        &self,
        query: GetComparisonProgressQuery,
    ) -> Result<ComparisonProgress, PairwiseError> {
        let set = self
            .sets
            .find_set(&query.set_id)
            .await?
            .filter(|set| set.project_id() == &query.project_id)
            .ok_or(PairwiseError::SetNotFound(query.set_id))?;

        let comparisons = self.sets.list_comparisons(set.id()).await?;
        Ok(ComparisonProgress::from_parts(set, &comparisons))
    }
}

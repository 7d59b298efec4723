//! InvalidateItemComparisonsHandler - Reopens comparisons after an item edit.
//!
//! Only Active sets are touched; Completed sets are frozen. A set that
//! completes mid-reset makes the store refuse the write, and the rest of
//! that set is left alone.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{
    CommandMetadata, ComparisonId, ErrorCode, EventId, ItemId, Timestamp,
};
use crate::domain::pairwise::{ComparisonSet, ComparisonsInvalidated, PairwiseError};
use crate::ports::ComparisonSetRepository;

use super::submit_vote::DEFAULT_MAX_VOTE_RETRIES;

#[derive(Debug, Clone)]
pub struct InvalidateItemComparisonsCommand {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Default)]
pub struct InvalidateItemComparisonsResult {
    /// One entry per Active set in which something was reset.
    pub invalidated: Vec<ComparisonsInvalidated>,
}

impl InvalidateItemComparisonsResult {
    pub fn comparison_count(&self) -> usize {
        self.invalidated.iter().map(|e| e.comparison_ids.len()).sum()
    }
}

pub struct InvalidateItemComparisonsHandler {
    sets: Arc<dyn ComparisonSetRepository>,
    emitter: EventEmitter,
    max_retries: u32,
}

impl InvalidateItemComparisonsHandler {
    pub fn new(sets: Arc<dyn ComparisonSetRepository>, emitter: EventEmitter) -> Self {
        Self {
            sets,
            emitter,
            max_retries: DEFAULT_MAX_VOTE_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn handle(
        &self,
        cmd: InvalidateItemComparisonsCommand,
        metadata: CommandMetadata,
    ) -> Result<InvalidateItemComparisonsResult, PairwiseError> {
        metadata.auth.require_facilitator("invalidate comparisons")?;
        let project_id = metadata.project_id();

        let mut result = InvalidateItemComparisonsResult::default();

        for set in self.sets.list_active(&project_id).await? {
            if !set.contains_item(&cmd.item_id) {
                continue;
            }

            let (comparison_ids, votes_cleared) = self.reset_in_set(&set, &cmd.item_id).await?;
            if comparison_ids.is_empty() {
                continue;
            }

            tracing::info!(
                set_id = %set.id(),
                item_id = %cmd.item_id,
                comparisons = comparison_ids.len(),
                votes_cleared,
                "comparisons invalidated"
            );

            let event = ComparisonsInvalidated {
                event_id: EventId::new(),
                set_id: *set.id(),
                project_id,
                item_id: cmd.item_id,
                comparison_ids,
                votes_cleared,
                invalidated_at: Timestamp::now(),
            };
            self.emitter.emit(&event, &metadata).await;
            result.invalidated.push(event);
        }

        Ok(result)
    }

    /// Clears votes on every comparison of `set` that involves `item_id`.
    async fn reset_in_set(
        &self,
        set: &ComparisonSet,
        item_id: &ItemId,
    ) -> Result<(Vec<ComparisonId>, usize), PairwiseError> {
        let mut reset_ids = Vec::new();
        let mut votes_cleared = 0;

        for candidate in self.sets.list_comparisons(set.id()).await? {
            if !candidate.involves(item_id) {
                continue;
            }
            if let Some(cleared) = self.reset_one(set, candidate.id()).await? {
                reset_ids.push(*candidate.id());
                votes_cleared += cleared;
            }
        }

        Ok((reset_ids, votes_cleared))
    }

    /// Returns the number of votes cleared, or `None` if there was nothing to reset.
    async fn reset_one(
        &self,
        set: &ComparisonSet,
        comparison_id: &ComparisonId,
    ) -> Result<Option<usize>, PairwiseError> {
        for _ in 0..=self.max_retries {
            // The set may have completed since it was listed
            let current = self
                .sets
                .find_set(set.id())
                .await?
                .ok_or(PairwiseError::SetNotFound(*set.id()))?;
            if !current.status().accepts_votes() {
                return Ok(None);
            }

            let mut comparison = self
                .sets
                .find_comparison(comparison_id)
                .await?
                .ok_or(PairwiseError::ComparisonNotFound(*comparison_id))?;
            if comparison.votes().is_empty() && !comparison.consensus_reached() {
                return Ok(None);
            }

            let expected_version = comparison.version();
            let cleared = comparison.reset();

            match self
                .sets
                .update_comparison(&comparison, expected_version)
                .await
            {
                Ok(()) => return Ok(Some(cleared)),
                Err(e) if e.code == ErrorCode::SessionNotActive => return Ok(None),
                Err(e) if e.code == ErrorCode::ConcurrencyConflict => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(PairwiseError::ConcurrencyConflict(format!(
            "Comparison {} kept changing while being reset",
            comparison_id
        )))
    }
}

//! In-memory comparison set store.
//!
//! Holds sets and comparisons behind one `tokio::sync::RwLock`. Every
//! compare-and-set runs under the write lock, which gives the same
//! per-comparison linearizability the database adapter gets from
//! `WHERE version = $n`. Completion checks and transitions under that same
//! lock, so it cannot interleave with a comparison write.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    ComparisonId, ComparisonSetId, Criterion, DomainError, ErrorCode, ItemId, ProjectId,
    Timestamp,
};
use crate::domain::pairwise::{win_weight, Comparison, ComparisonSet, WinTally};
use crate::ports::{ComparisonSetRepository, WinTallyReader};

#[derive(Debug, Default)]
struct Inner {
    /// Creation order.
    sets: Vec<ComparisonSet>,
    comparisons: HashMap<ComparisonId, Comparison>,
}

impl Inner {
    fn set_mut(&mut self, id: &ComparisonSetId) -> Option<&mut ComparisonSet> {
        self.sets.iter_mut().find(|s| s.id() == id)
    }

    fn set(&self, id: &ComparisonSetId) -> Option<&ComparisonSet> {
        self.sets.iter().find(|s| s.id() == id)
    }

    fn comparisons_of(&self, set_id: &ComparisonSetId) -> Vec<Comparison> {
        let mut found: Vec<Comparison> = self
            .comparisons
            .values()
            .filter(|c| c.set_id() == set_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.position());
        found
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryComparisonStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryComparisonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_count(&self) -> usize {
        self.inner.read().await.sets.len()
    }
}

#[async_trait]
impl ComparisonSetRepository for InMemoryComparisonStore {
    async fn create(
        &self,
        set: &ComparisonSet,
        comparisons: &[Comparison],
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;

        let duplicate = inner.sets.iter().any(|s| {
            s.project_id() == set.project_id()
                && s.criterion() == set.criterion()
                && s.status().accepts_votes()
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::ActiveSessionExists,
                format!("An active {} session already exists", set.criterion()),
            ));
        }

        inner.sets.push(set.clone());
        for comparison in comparisons {
            inner.comparisons.insert(*comparison.id(), comparison.clone());
        }
        Ok(())
    }

    async fn find_set(&self, id: &ComparisonSetId) -> Result<Option<ComparisonSet>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.sets.iter().find(|s| s.id() == id).cloned())
    }

    async fn find_active(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sets
            .iter()
            .find(|s| {
                s.project_id() == project_id
                    && s.criterion() == criterion
                    && s.status().accepts_votes()
            })
            .cloned())
    }

    async fn find_latest(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sets
            .iter()
            .rev()
            .find(|s| s.project_id() == project_id && s.criterion() == criterion)
            .cloned())
    }

    async fn list_active(&self, project_id: &ProjectId) -> Result<Vec<ComparisonSet>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sets
            .iter()
            .filter(|s| s.project_id() == project_id && s.status().accepts_votes())
            .cloned()
            .collect())
    }

    async fn find_comparison(&self, id: &ComparisonId) -> Result<Option<Comparison>, DomainError> {
        Ok(self.inner.read().await.comparisons.get(id).cloned())
    }

    async fn list_comparisons(
        &self,
        set_id: &ComparisonSetId,
    ) -> Result<Vec<Comparison>, DomainError> {
        Ok(self.inner.read().await.comparisons_of(set_id))
    }

    async fn update_comparison(
        &self,
        comparison: &Comparison,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let set_id = *inner
            .comparisons
            .get(comparison.id())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ComparisonNotFound,
                    format!("Comparison not found: {}", comparison.id()),
                )
            })?
            .set_id();

        let active = inner
            .set(&set_id)
            .map(|set| set.status().accepts_votes())
            .unwrap_or(false);
        if !active {
            return Err(DomainError::new(
                ErrorCode::SessionNotActive,
                format!("Comparison set {} no longer accepts votes", set_id),
            ));
        }

        let stored = inner.comparisons.get_mut(comparison.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ComparisonNotFound,
                format!("Comparison not found: {}", comparison.id()),
            )
        })?;

        if stored.version() != expected_version {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Comparison {} is at version {}, expected {}",
                    comparison.id(),
                    stored.version(),
                    expected_version
                ),
            ));
        }

        *stored = comparison.clone();
        Ok(())
    }

    async fn complete_if_resolved(
        &self,
        set_id: &ComparisonSetId,
        completed_at: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;
        let open = inner
            .comparisons
            .values()
            .any(|c| c.set_id() == set_id && !c.consensus_reached());
        let set = inner.set_mut(set_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ComparisonSetNotFound,
                format!("Comparison set not found: {}", set_id),
            )
        })?;

        if open || !set.status().accepts_votes() {
            return Ok(false);
        }
        set.complete(completed_at)?;
        Ok(true)
    }
}

#[async_trait]
impl WinTallyReader for InMemoryComparisonStore {
    async fn tallies(
        &self,
        set_id: &ComparisonSetId,
    ) -> Result<HashMap<ItemId, WinTally>, DomainError> {
        let comparisons = self.inner.read().await.comparisons_of(set_id);
        Ok(win_weight::tally(&comparisons))
    }
}

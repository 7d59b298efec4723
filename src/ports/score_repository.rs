//! Score persistence ports: raw entries and locked consensus.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ItemId, ProjectId};
use crate::domain::scoring::{ConsensusScore, ScoreEntry};

/// Attendee score entries, keyed by `(item, attendee, criterion)`.
#[async_trait]
pub trait ScoreEntryRepository: Send + Sync {
    /// Insert or replace the entry in its slot.
    ///
    /// Returns the entry that was replaced, if any.
    async fn upsert(&self, entry: &ScoreEntry) -> Result<Option<ScoreEntry>, DomainError>;

    /// All entries for one item, both criteria.
    async fn list_for_item(&self, item_id: &ItemId) -> Result<Vec<ScoreEntry>, DomainError>;

    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<ScoreEntry>, DomainError>;
}

/// Locked consensus scores, one per item.
///
/// Writes are compare-and-set on the aggregate version so a lock and a
/// concurrent unlock cannot both succeed against the same state.
#[async_trait]
pub trait ConsensusScoreRepository: Send + Sync {
    async fn find(&self, item_id: &ItemId) -> Result<Option<ConsensusScore>, DomainError>;

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ConsensusScore>, DomainError>;

    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the item already has a consensus score
    async fn insert(&self, consensus: &ConsensusScore) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the stored version is not `expected_version`
    ///   or the row is gone
    async fn update(
        &self,
        consensus: &ConsensusScore,
        expected_version: u32,
    ) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the stored version is not `expected_version`
    ///   or the row is gone
    async fn delete(&self, item_id: &ItemId, expected_version: u32) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_ports_are_object_safe() {
        fn _entries(_repo: &dyn ScoreEntryRepository) {}
        fn _consensus(_repo: &dyn ConsensusScoreRepository) {}
    }
}

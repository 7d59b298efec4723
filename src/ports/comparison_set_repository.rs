//! Comparison set repository port.
//!
//! Sets and their comparisons are stored as separate rows so a vote only
//! ever rewrites one comparison. Comparisons carry a version; updates are
//! compare-and-set on it, which serializes concurrent votes per comparison
//! without locking the whole set. Comparison writes and set completion are
//! mutually exclusive: a completed set never gains an unresolved comparison.

use async_trait::async_trait;

use crate::domain::foundation::{
    ComparisonId, ComparisonSetId, Criterion, DomainError, ProjectId, Timestamp,
};
use crate::domain::pairwise::{Comparison, ComparisonSet};

#[async_trait]
pub trait ComparisonSetRepository: Send + Sync {
    /// Persist a new set together with all of its comparisons.
    ///
    /// Nothing is written if any part fails.
    ///
    /// # Errors
    ///
    /// - `ActiveSessionExists` if the project already has an active set for
    ///   the same criterion
    /// - `DatabaseError` on persistence failure
    async fn create(&self, set: &ComparisonSet, comparisons: &[Comparison])
        -> Result<(), DomainError>;

    async fn find_set(&self, id: &ComparisonSetId) -> Result<Option<ComparisonSet>, DomainError>;

    /// The active set for a project and criterion, if any.
    async fn find_active(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError>;

    /// The most recently created set for a project and criterion, active or not.
    async fn find_latest(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError>;

    async fn list_active(&self, project_id: &ProjectId) -> Result<Vec<ComparisonSet>, DomainError>;

    async fn find_comparison(&self, id: &ComparisonId) -> Result<Option<Comparison>, DomainError>;

    /// Comparisons of a set in schedule order.
    async fn list_comparisons(&self, set_id: &ComparisonSetId)
        -> Result<Vec<Comparison>, DomainError>;

    /// Store a mutated comparison if nobody changed it since it was read.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the stored version is not `expected_version`
    /// - `SessionNotActive` if the parent set no longer accepts votes
    /// - `ComparisonNotFound` if the comparison does not exist
    /// - `DatabaseError` on persistence failure
    async fn update_comparison(
        &self,
        comparison: &Comparison,
        expected_version: u32,
    ) -> Result<(), DomainError>;

    /// Atomically move the set from `Active` to `Completed`, provided every
    /// one of its comparisons has reached consensus.
    ///
    /// The check and the transition are one write; no comparison update can
    /// land between them. Returns `true` only for the call that performed
    /// the transition. An already completed set, or one with an open
    /// comparison, yields `false`.
    ///
    /// # Errors
    ///
    /// - `ComparisonSetNotFound` if the set does not exist
    async fn complete_if_resolved(
        &self,
        set_id: &ComparisonSetId,
        completed_at: Timestamp,
    ) -> Result<bool, DomainError>;
}

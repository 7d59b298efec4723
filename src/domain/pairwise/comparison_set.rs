//! ComparisonSet aggregate: one pairwise session per project and criterion.
//!
//! The set header (status, expected voters, consensus rule) is stored apart
//! from its comparisons so votes on different comparisons never contend on
//! the same row. Completion is a one-way transition that happens once.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendeeId, ComparisonSetId, Criterion, DomainError, ItemId, ProjectId, StateMachine,
    Timestamp,
};

use super::consensus::ConsensusRule;
use super::errors::PairwiseError;
use super::status::ComparisonSetStatus;

/// Header of a pairwise comparison session.
///
/// # Invariants
///
/// - `item_ids` holds at least two distinct items, in schedule order
/// - `expected_voters` is the attendee snapshot taken when the session started
/// - `completed_at` is set iff `status == Completed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSet {
    id: ComparisonSetId,
    project_id: ProjectId,
    criterion: Criterion,
    status: ComparisonSetStatus,
    item_ids: Vec<ItemId>,
    expected_voters: Vec<AttendeeId>,
    rule: ConsensusRule,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl ComparisonSet {
    pub(crate) fn new(
        project_id: ProjectId,
        criterion: Criterion,
        item_ids: Vec<ItemId>,
        expected_voters: Vec<AttendeeId>,
        rule: ConsensusRule,
    ) -> Self {
        Self {
            id: ComparisonSetId::new(),
            project_id,
            criterion,
            status: ComparisonSetStatus::Active,
            item_ids,
            expected_voters,
            rule,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Reconstitute a set from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ComparisonSetId,
        project_id: ProjectId,
        criterion: Criterion,
        status: ComparisonSetStatus,
        item_ids: Vec<ItemId>,
        expected_voters: Vec<AttendeeId>,
        rule: ConsensusRule,
        created_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            project_id,
            criterion,
            status,
            item_ids,
            expected_voters,
            rule,
            created_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ComparisonSetId {
        &self.id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn status(&self) -> ComparisonSetStatus {
        self.status
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    pub fn expected_voters(&self) -> &[AttendeeId] {
        &self.expected_voters
    }

    pub fn rule(&self) -> &ConsensusRule {
        &self.rule
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    /// Number of comparisons a full schedule holds: `N*(N-1)/2`.
    pub fn pair_count(&self) -> usize {
        super::scheduler::pair_count(self.item_ids.len())
    }

    pub fn contains_item(&self, item: &ItemId) -> bool {
        self.item_ids.contains(item)
    }

    pub fn is_expected_voter(&self, attendee: &AttendeeId) -> bool {
        self.expected_voters.contains(attendee)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Guards & transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// - `SessionNotActive` once the set has completed
    pub fn ensure_active(&self) -> Result<(), PairwiseError> {
        if self.status.accepts_votes() {
            Ok(())
        } else {
            Err(PairwiseError::SessionNotActive(self.id))
        }
    }

    /// Moves the set to `Completed`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the set already completed
    pub fn complete(&mut self, at: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(ComparisonSetStatus::Completed)?;
        self.completed_at = Some(at);
        Ok(())
    }
}

//! Pairwise domain events.
//!
//! - `ComparisonSessionStarted` - A set and its comparisons were scheduled
//! - `VoteRecorded` - An attendee's vote was upserted
//! - `ComparisonResolved` - A comparison reached consensus
//! - `ComparisonSetCompleted` - Every comparison in a set resolved
//! - `ComparisonsInvalidated` - Comparisons touching an edited item were reopened

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, AttendeeId, ComparisonId, ComparisonSetId, Criterion, EventId, ItemId,
    ProjectId, Timestamp,
};

use super::consensus::Outcome;
use super::vote::VoteChoice;

// ════════════════════════════════════════════════════════════════════════════
// ComparisonSessionStarted
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSessionStarted {
    pub event_id: EventId,
    pub set_id: ComparisonSetId,
    pub project_id: ProjectId,
    pub criterion: Criterion,
    pub item_ids: Vec<ItemId>,
    pub comparison_count: usize,
    pub expected_voter_count: usize,
    pub quorum_percent: u8,
    pub started_at: Timestamp,
}

domain_event!(
    ComparisonSessionStarted,
    event_type = "pairwise.session_started.v1",
    schema_version = 1,
    aggregate_id = set_id,
    aggregate_type = "ComparisonSet",
    occurred_at = started_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// VoteRecorded
// ════════════════════════════════════════════════════════════════════════════

/// Published for every accepted vote, including revisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecorded {
    pub event_id: EventId,
    pub comparison_id: ComparisonId,
    pub set_id: ComparisonSetId,
    pub project_id: ProjectId,
    pub attendee_id: AttendeeId,
    pub choice: VoteChoice,
    /// True when this vote replaced the attendee's earlier one.
    pub replaced: bool,
    /// Outcome of the comparison after this vote.
    pub outcome: Outcome,
    pub vote_count: usize,
    pub recorded_at: Timestamp,
}

domain_event!(
    VoteRecorded,
    event_type = "pairwise.vote_recorded.v1",
    schema_version = 1,
    aggregate_id = comparison_id,
    aggregate_type = "Comparison",
    occurred_at = recorded_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ComparisonResolved
// ════════════════════════════════════════════════════════════════════════════

/// Published when a comparison's outcome changes to a resolved value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResolved {
    pub event_id: EventId,
    pub comparison_id: ComparisonId,
    pub set_id: ComparisonSetId,
    pub project_id: ProjectId,
    pub criterion: Criterion,
    pub item_a: ItemId,
    pub item_b: ItemId,
    pub outcome: Outcome,
    /// `None` for a tie.
    pub winner: Option<ItemId>,
    pub resolved_at: Timestamp,
}

domain_event!(
    ComparisonResolved,
    event_type = "pairwise.comparison_resolved.v1",
    schema_version = 1,
    aggregate_id = comparison_id,
    aggregate_type = "Comparison",
    occurred_at = resolved_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ComparisonSetCompleted
// ════════════════════════════════════════════════════════════════════════════

/// Published exactly once per set, when its last comparison resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSetCompleted {
    pub event_id: EventId,
    pub set_id: ComparisonSetId,
    pub project_id: ProjectId,
    pub criterion: Criterion,
    pub comparison_count: usize,
    pub completed_at: Timestamp,
}

domain_event!(
    ComparisonSetCompleted,
    event_type = "pairwise.set_completed.v1",
    schema_version = 1,
    aggregate_id = set_id,
    aggregate_type = "ComparisonSet",
    occurred_at = completed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ComparisonsInvalidated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonsInvalidated {
    pub event_id: EventId,
    pub set_id: ComparisonSetId,
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub comparison_ids: Vec<ComparisonId>,
    pub votes_cleared: usize,
    pub invalidated_at: Timestamp,
}

domain_event!(
    ComparisonsInvalidated,
    event_type = "pairwise.comparisons_invalidated.v1",
    schema_version = 1,
    aggregate_id = set_id,
    aggregate_type = "ComparisonSet",
    occurred_at = invalidated_at,
    event_id = event_id
);

//! Scoring domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, AttendeeId, Criterion, EventId, ItemId, ProjectId, Timestamp,
};

use super::consensus_score::LockedValues;

/// Published when an attendee submits or revises a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecorded {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub attendee_id: AttendeeId,
    pub criterion: Criterion,
    pub value: u32,
    /// Value this submission replaced, if any.
    pub previous_value: Option<u32>,
    pub recorded_at: Timestamp,
}

domain_event!(
    ScoreRecorded,
    event_type = "scoring.score_recorded.v1",
    schema_version = 1,
    aggregate_id = item_id,
    aggregate_type = "ScoreEntry",
    occurred_at = recorded_at,
    event_id = event_id
);

/// Published when a facilitator locks or overwrites an item's consensus.
///
/// `previous` carries the replaced values for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusLocked {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub s_value: u32,
    pub s_complexity: u32,
    pub locked_by: AttendeeId,
    pub rationale: Option<String>,
    pub previous: Option<LockedValues>,
    pub locked_at: Timestamp,
}

domain_event!(
    ConsensusLocked,
    event_type = "scoring.consensus_locked.v1",
    schema_version = 1,
    aggregate_id = item_id,
    aggregate_type = "ConsensusScore",
    occurred_at = locked_at,
    event_id = event_id
);

/// Published when a facilitator removes an item's consensus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusUnlocked {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub unlocked_by: AttendeeId,
    pub removed: LockedValues,
    pub unlocked_at: Timestamp,
}

domain_event!(
    ConsensusUnlocked,
    event_type = "scoring.consensus_unlocked.v1",
    schema_version = 1,
    aggregate_id = item_id,
    aggregate_type = "ConsensusScore",
    occurred_at = unlocked_at,
    event_id = event_id
);

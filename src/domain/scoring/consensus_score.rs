//! ConsensusScore aggregate: the facilitator-locked score pair for an item.
//!
//! This is the authoritative ranking input. It does not have to match any
//! statistic over the attendees' raw score entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttendeeId, ItemId, ProjectId, ScoreValue, Timestamp};

/// The locked values, as captured for audit on overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedValues {
    pub s_value: u32,
    pub s_complexity: u32,
}

/// Facilitator-locked score pair for one item.
///
/// Values are held as raw integers: `lock` and `relock` only accept scale
/// members, but rows read back from storage are not re-validated, so
/// consumers must not assume `s_complexity > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusScore {
    project_id: ProjectId,
    item_id: ItemId,
    s_value: u32,
    s_complexity: u32,
    locked_by: AttendeeId,
    locked_at: Timestamp,
    rationale: Option<String>,
    version: u32,
}

impl ConsensusScore {
    /// Locks a fresh consensus score.
    pub fn lock(
        project_id: ProjectId,
        item_id: ItemId,
        s_value: ScoreValue,
        s_complexity: ScoreValue,
        locked_by: AttendeeId,
        rationale: Option<String>,
    ) -> Self {
        Self {
            project_id,
            item_id,
            s_value: s_value.value(),
            s_complexity: s_complexity.value(),
            locked_by,
            locked_at: Timestamp::now(),
            rationale,
            version: 0,
        }
    }

    /// Reconstitute from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        project_id: ProjectId,
        item_id: ItemId,
        s_value: u32,
        s_complexity: u32,
        locked_by: AttendeeId,
        locked_at: Timestamp,
        rationale: Option<String>,
        version: u32,
    ) -> Self {
        Self {
            project_id,
            item_id,
            s_value,
            s_complexity,
            locked_by,
            locked_at,
            rationale,
            version,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn s_value(&self) -> u32 {
        self.s_value
    }

    pub fn s_complexity(&self) -> u32 {
        self.s_complexity
    }

    pub fn locked_by(&self) -> &AttendeeId {
        &self.locked_by
    }

    pub fn locked_at(&self) -> &Timestamp {
        &self.locked_at
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn values(&self) -> LockedValues {
        LockedValues {
            s_value: self.s_value,
            s_complexity: self.s_complexity,
        }
    }

    /// Overwrites the lock and returns the values it replaced.
    pub fn relock(
        &mut self,
        s_value: ScoreValue,
        s_complexity: ScoreValue,
        locked_by: AttendeeId,
        rationale: Option<String>,
    ) -> LockedValues {
        let previous = self.values();
        self.s_value = s_value.value();
        self.s_complexity = s_complexity.value();
        self.locked_by = locked_by;
        self.locked_at = Timestamp::now();
        self.rationale = rationale;
        self.version += 1;
        previous
    }
}

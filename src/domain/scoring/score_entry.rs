//! ScoreEntry: one attendee's absolute score for one item and criterion.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendeeId, Criterion, ItemId, ProjectId, ScoreValue, Timestamp, ValidationError,
};

/// Maximum length of a free-text rationale.
pub const MAX_RATIONALE_LENGTH: usize = 2000;

/// Normalizes an optional rationale: blank becomes `None`, overlong is rejected.
pub fn normalize_rationale(rationale: Option<String>) -> Result<Option<String>, ValidationError> {
    match rationale {
        None => Ok(None),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let len = trimmed.chars().count();
            if len > MAX_RATIONALE_LENGTH {
                return Err(ValidationError::out_of_range(
                    "rationale",
                    0,
                    MAX_RATIONALE_LENGTH as i64,
                    len as i64,
                ));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// An attendee's score.
///
/// Keyed by `(item_id, attendee_id, criterion)`; a resubmission replaces
/// the previous entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub attendee_id: AttendeeId,
    pub criterion: Criterion,
    pub value: ScoreValue,
    pub rationale: Option<String>,
    pub recorded_at: Timestamp,
}

impl ScoreEntry {
    /// # Errors
    ///
    /// - `OutOfRange` if the rationale is too long
    pub fn new(
        project_id: ProjectId,
        item_id: ItemId,
        attendee_id: AttendeeId,
        criterion: Criterion,
        value: ScoreValue,
        rationale: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            project_id,
            item_id,
            attendee_id,
            criterion,
            value,
            rationale: normalize_rationale(rationale)?,
            recorded_at: Timestamp::now(),
        })
    }

    /// True when both entries occupy the same upsert slot.
    pub fn same_slot(&self, other: &ScoreEntry) -> bool {
        self.item_id == other.item_id
            && self.attendee_id == other.attendee_id
            && self.criterion == other.criterion
    }
}

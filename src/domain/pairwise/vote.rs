//! Vote value objects.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttendeeId, ItemId, Timestamp, ValidationError};

/// What an attendee picked on a head-to-head comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item_id", rename_all = "snake_case")]
pub enum VoteChoice {
    /// The attendee prefers this item.
    Prefer(ItemId),
    /// The attendee judges both items equal.
    Tie,
}

impl VoteChoice {
    /// Builds a choice from the loose shape callers submit.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if a tie also names an item, or a non-tie names none
    pub fn from_parts(chosen_item: Option<ItemId>, is_tie: bool) -> Result<Self, ValidationError> {
        match (chosen_item, is_tie) {
            (None, true) => Ok(VoteChoice::Tie),
            (Some(item), false) => Ok(VoteChoice::Prefer(item)),
            (Some(_), true) => Err(ValidationError::invalid_format(
                "choice",
                "a tie vote must not name a preferred item",
            )),
            (None, false) => Err(ValidationError::invalid_format(
                "choice",
                "a vote must name a preferred item or be a tie",
            )),
        }
    }

    /// Returns the preferred item, if any.
    pub fn preferred_item(&self) -> Option<ItemId> {
        match self {
            VoteChoice::Prefer(item) => Some(*item),
            VoteChoice::Tie => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, VoteChoice::Tie)
    }
}

/// One attendee's live vote on one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub attendee_id: AttendeeId,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
}

impl Vote {
    pub fn new(attendee_id: AttendeeId, choice: VoteChoice) -> Self {
        Self {
            attendee_id,
            choice,
            cast_at: Timestamp::now(),
        }
    }
}

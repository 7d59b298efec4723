//! Registry domain module.
//!
//! Items and attendees are owned by an external registry. The engine only
//! reads them: items become comparison candidates and ranking rows,
//! attendees become expected voters and score authors.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttendeeId, ItemId, ProjectId, ValidationError};

/// A candidate work item as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub project_id: ProjectId,
    /// Display name; the final ranking tie-break.
    pub name: String,
}

impl Item {
    /// Creates an item, rejecting a blank name.
    pub fn new(
        id: ItemId,
        project_id: ProjectId,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id,
            project_id,
            name,
        })
    }
}

/// A workshop participant as supplied by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub project_id: ProjectId,
    pub is_facilitator: bool,
}

impl Attendee {
    pub fn new(id: AttendeeId, project_id: ProjectId, is_facilitator: bool) -> Self {
        Self {
            id,
            project_id,
            is_facilitator,
        }
    }
}

/// Snapshot of everything the registry knows about one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub items: Vec<Item>,
    pub attendees: Vec<Attendee>,
}

impl Roster {
    /// Looks up an item by id.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns true if the attendee is registered for this project.
    pub fn has_attendee(&self, id: &AttendeeId) -> bool {
        self.attendees.iter().any(|attendee| &attendee.id == id)
    }

    /// Attendee ids in registry order.
    pub fn attendee_ids(&self) -> Vec<AttendeeId> {
        self.attendees.iter().map(|attendee| attendee.id).collect()
    }
}

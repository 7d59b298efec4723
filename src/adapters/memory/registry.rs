//! In-memory workshop registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ItemId, ProjectId};
use crate::domain::registry::{Attendee, Item, Roster};
use crate::ports::WorkshopRegistry;

/// Registry seeded by the caller; stands in for the external system.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    rosters: Arc<RwLock<HashMap<ProjectId, Roster>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, item: Item) {
        self.rosters
            .write()
            .await
            .entry(item.project_id)
            .or_default()
            .items
            .push(item);
    }

    pub async fn add_attendee(&self, attendee: Attendee) {
        self.rosters
            .write()
            .await
            .entry(attendee.project_id)
            .or_default()
            .attendees
            .push(attendee);
    }

    /// Removes an item; returns true if it existed.
    pub async fn remove_item(&self, project_id: &ProjectId, item_id: &ItemId) -> bool {
        let mut rosters = self.rosters.write().await;
        match rosters.get_mut(project_id) {
            Some(roster) => {
                let before = roster.items.len();
                roster.items.retain(|i| &i.id != item_id);
                roster.items.len() != before
            }
            None => false,
        }
    }
}

#[async_trait]
impl WorkshopRegistry for InMemoryRegistry {
    async fn roster(&self, project_id: &ProjectId) -> Result<Option<Roster>, DomainError> {
        Ok(self.rosters.read().await.get(project_id).cloned())
    }
}

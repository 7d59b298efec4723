//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::InMemoryRegistry;
use crate::application::EventEmitter;
use crate::domain::foundation::{AttendeeId, AuthContext, CommandMetadata, ItemId, ProjectId};
use crate::domain::registry::{Attendee, Item};

/// One project with a facilitator, some team members and named items.
pub(crate) struct Workshop {
    pub project_id: ProjectId,
    pub facilitator: AttendeeId,
    pub members: Vec<AttendeeId>,
    pub items: Vec<Item>,
    pub registry: Arc<InMemoryRegistry>,
    pub bus: Arc<InMemoryEventBus>,
}

impl Workshop {
    pub async fn new(item_names: &[&str], member_count: usize) -> Self {
        let project_id = ProjectId::new();
        let registry = Arc::new(InMemoryRegistry::new());

        let facilitator = AttendeeId::new();
        registry
            .add_attendee(Attendee::new(facilitator, project_id, true))
            .await;

        let mut members = Vec::with_capacity(member_count);
        for _ in 0..member_count {
            let member = AttendeeId::new();
            registry
                .add_attendee(Attendee::new(member, project_id, false))
                .await;
            members.push(member);
        }

        let mut items = Vec::with_capacity(item_names.len());
        for name in item_names {
            let item = Item::new(ItemId::new(), project_id, *name).unwrap();
            registry.add_item(item.clone()).await;
            items.push(item);
        }

        Self {
            project_id,
            facilitator,
            members,
            items,
            registry,
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    pub fn item(&self, index: usize) -> ItemId {
        self.items[index].id
    }

    /// Facilitator first, then members.
    pub fn voters(&self) -> Vec<AttendeeId> {
        std::iter::once(self.facilitator)
            .chain(self.members.iter().copied())
            .collect()
    }

    pub fn facilitator_metadata(&self) -> CommandMetadata {
        CommandMetadata::new(AuthContext::facilitator(self.facilitator, self.project_id))
            .with_correlation_id("test-correlation")
    }

    pub fn metadata_for(&self, attendee: AttendeeId) -> CommandMetadata {
        let auth = if attendee == self.facilitator {
            AuthContext::facilitator(attendee, self.project_id)
        } else {
            AuthContext::attendee(attendee, self.project_id)
        };
        CommandMetadata::new(auth).with_correlation_id("test-correlation")
    }

    pub fn emitter(&self) -> EventEmitter {
        EventEmitter::with_logging_observer(self.bus.clone())
    }
}

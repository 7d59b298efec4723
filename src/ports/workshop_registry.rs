//! Workshop registry port.
//!
//! Items and attendees live in an external registry. The engine reads a
//! project's roster and never writes it.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::registry::Roster;

#[async_trait]
pub trait WorkshopRegistry: Send + Sync {
    /// Current items and attendees of a project.
    ///
    /// Returns `None` for an unknown project.
    async fn roster(&self, project_id: &ProjectId) -> Result<Option<Roster>, DomainError>;
}

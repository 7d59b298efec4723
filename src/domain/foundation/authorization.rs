//! Authorization context supplied by the caller.
//!
//! The engine never parses credentials. An external authorization
//! collaborator validates the request and hands over an [`AuthContext`];
//! facilitator-gated operations check the capability flag carried here.

use serde::{Deserialize, Serialize};

use super::{AttendeeId, DomainError, ErrorCode, ProjectId};

/// Validated identity and capability of the caller for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// The attendee issuing the request.
    pub attendee_id: AttendeeId,

    /// The project the request is scoped to.
    pub project_id: ProjectId,

    /// Whether the attendee holds the facilitator capability.
    pub is_facilitator: bool,
}

impl AuthContext {
    /// Context for a regular voting attendee.
    pub fn attendee(attendee_id: AttendeeId, project_id: ProjectId) -> Self {
        Self {
            attendee_id,
            project_id,
            is_facilitator: false,
        }
    }

    /// Context for a facilitator.
    pub fn facilitator(attendee_id: AttendeeId, project_id: ProjectId) -> Self {
        Self {
            attendee_id,
            project_id,
            is_facilitator: true,
        }
    }

    /// Fails with `FacilitatorRequired` unless the caller is a facilitator.
    pub fn require_facilitator(&self, action: &str) -> Result<(), DomainError> {
        if self.is_facilitator {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::FacilitatorRequired,
                format!("Only a facilitator may {}", action),
            )
            .with_detail("attendee_id", self.attendee_id.to_string()))
        }
    }

    /// Fails with `Forbidden` if the request targets another project.
    pub fn require_project(&self, project_id: &ProjectId) -> Result<(), DomainError> {
        if &self.project_id == project_id {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Request is scoped to a different project",
            )
            .with_detail("project_id", project_id.to_string()))
        }
    }
}

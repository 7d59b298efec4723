//! Command infrastructure for CQRS handlers.
//!
//! Every handler accepts a `CommandMetadata` carrying the caller's
//! [`AuthContext`] and correlation id. Nothing request-scoped lives in
//! module-level state; it is passed in with each call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendeeId, AuthContext, EventEnvelope, ProjectId};

/// Metadata context for command handlers.
///
/// # Example
///
/// ```ignore
/// let metadata = CommandMetadata::new(auth).with_correlation_id("req-42");
/// handler.handle(cmd, metadata).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Validated caller identity and capability.
    pub auth: AuthContext,

    /// Links related operations across a single request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandMetadata {
    /// Creates new command metadata for an authorized caller.
    pub fn new(auth: AuthContext) -> Self {
        Self {
            auth,
            correlation_id: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Fixes a correlation ID so every event of one command shares it.
    pub fn ensure_correlation_id(mut self) -> Self {
        if self.correlation_id.is_none() {
            self.correlation_id = Some(Uuid::new_v4().to_string());
        }
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the correlation ID only if explicitly set.
    pub fn correlation_id_opt(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the acting attendee.
    pub fn attendee_id(&self) -> AttendeeId {
        self.auth.attendee_id
    }

    /// Returns the project the request is scoped to.
    pub fn project_id(&self) -> ProjectId {
        self.auth.project_id
    }

    /// Stamps an outgoing envelope with this request's context.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        envelope
            .with_correlation_id(self.correlation_id())
            .with_project_id(self.auth.project_id.to_string())
            .with_attendee_id(self.auth.attendee_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth() -> AuthContext {
        AuthContext::attendee(AttendeeId::new(), ProjectId::new())
    }

    #[test]
    fn correlation_id_is_generated_when_missing() {
        let metadata = CommandMetadata::new(test_auth());
        assert!(metadata.correlation_id_opt().is_none());
        assert!(!metadata.correlation_id().is_empty());
    }

    #[test]
    fn explicit_correlation_id_is_kept() {
        let metadata = CommandMetadata::new(test_auth()).with_correlation_id("req-1");
        assert_eq!(metadata.correlation_id(), "req-1");
    }

    #[test]
    fn ensure_correlation_id_makes_it_stable() {
        let metadata = CommandMetadata::new(test_auth()).ensure_correlation_id();
        assert_eq!(metadata.correlation_id(), metadata.correlation_id());
    }

    #[test]
    fn stamp_copies_request_context_into_envelope() {
        let auth = test_auth();
        let metadata = CommandMetadata::new(auth).with_correlation_id("req-7");

        let envelope = metadata.stamp(EventEnvelope::test_fixture());

        assert_eq!(envelope.metadata.correlation_id.as_deref(), Some("req-7"));
        assert_eq!(
            envelope.metadata.project_id,
            Some(auth.project_id.to_string())
        );
        assert_eq!(
            envelope.metadata.attendee_id,
            Some(auth.attendee_id.to_string())
        );
    }
}

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, event plumbing and error
//! types that form the vocabulary of the prioritization workshop domain.

mod authorization;
mod command;
mod criterion;
mod errors;
mod events;
mod ids;
mod score_value;
mod state_machine;
mod timestamp;

pub use authorization::AuthContext;
pub use command::CommandMetadata;
pub use criterion::Criterion;
pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{AttendeeId, ComparisonId, ComparisonSetId, ItemId, ProjectId};
pub use score_value::{ScoreValue, SCORE_SCALE};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

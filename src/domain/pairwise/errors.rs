//! Pairwise-comparison error types.

use thiserror::Error;

use crate::domain::foundation::{
    AttendeeId, ComparisonId, ComparisonSetId, Criterion, DomainError, ErrorCategory, ErrorCode,
    ItemId, ProjectId, ValidationError,
};

/// Errors raised by the comparison scheduler and vote aggregator.
#[derive(Debug, Clone, Error)]
pub enum PairwiseError {
    #[error("At least 2 items are required to start a session, got {count}")]
    TooFewItems { count: usize },

    #[error("Item {0} appears more than once")]
    DuplicateItem(ItemId),

    #[error("Project has no attendees to vote")]
    NoExpectedVoters,

    #[error("Invalid vote: {0}")]
    InvalidChoice(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Attendee {0} is not an expected voter in this project")]
    AttendeeNotFound(AttendeeId),

    #[error("Comparison set not found: {0}")]
    SetNotFound(ComparisonSetId),

    #[error("Comparison not found: {0}")]
    ComparisonNotFound(ComparisonId),

    #[error("An active {criterion} session already exists for this project")]
    ActiveSessionExists { criterion: Criterion },

    #[error("Concurrent update lost: {0}")]
    ConcurrencyConflict(String),

    #[error("Comparison set {0} is not active")]
    SessionNotActive(ComparisonSetId),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{message}")]
    Infrastructure { code: ErrorCode, message: String },
}

impl PairwiseError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PairwiseError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PairwiseError::Infrastructure {
            code: ErrorCode::DatabaseError,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PairwiseError::TooFewItems { .. } => ErrorCode::TooFewItems,
            PairwiseError::DuplicateItem(_) => ErrorCode::DuplicateItem,
            PairwiseError::NoExpectedVoters => ErrorCode::ValidationFailed,
            PairwiseError::InvalidChoice(_) => ErrorCode::InvalidVoteChoice,
            PairwiseError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PairwiseError::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            PairwiseError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            PairwiseError::AttendeeNotFound(_) => ErrorCode::AttendeeNotFound,
            PairwiseError::SetNotFound(_) => ErrorCode::ComparisonSetNotFound,
            PairwiseError::ComparisonNotFound(_) => ErrorCode::ComparisonNotFound,
            PairwiseError::ActiveSessionExists { .. } => ErrorCode::ActiveSessionExists,
            PairwiseError::ConcurrencyConflict(_) => ErrorCode::ConcurrencyConflict,
            PairwiseError::SessionNotActive(_) => ErrorCode::SessionNotActive,
            PairwiseError::Forbidden(_) => ErrorCode::Forbidden,
            PairwiseError::Infrastructure { code, .. } => *code,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl From<ValidationError> for PairwiseError {
    fn from(err: ValidationError) -> Self {
        PairwiseError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<DomainError> for PairwiseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrencyConflict => PairwiseError::ConcurrencyConflict(err.message),
            ErrorCode::Forbidden | ErrorCode::FacilitatorRequired => {
                PairwiseError::Forbidden(err.message)
            }
            ErrorCode::ValidationFailed => PairwiseError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            code => PairwiseError::Infrastructure {
                code,
                message: err.message,
            },
        }
    }
}

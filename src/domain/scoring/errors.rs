//! Scoring error types.

use thiserror::Error;

use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCategory, ErrorCode, ItemId, ValidationError,
};

/// Errors raised by score submission and consensus locking.
#[derive(Debug, Clone, Error)]
pub enum ScoringError {
    #[error("Invalid score for '{field}': {message}")]
    InvalidScore { field: String, message: String },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Attendee {0} does not belong to this project")]
    AttendeeNotFound(AttendeeId),

    #[error("No consensus score is locked for item {0}")]
    ConsensusNotFound(ItemId),

    #[error("Consensus for item {0} changed concurrently")]
    ConcurrencyConflict(ItemId),

    #[error("Facilitator role required: {0}")]
    FacilitatorRequired(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{message}")]
    Infrastructure { code: ErrorCode, message: String },
}

impl ScoringError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ScoringError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ScoringError::Infrastructure {
            code: ErrorCode::DatabaseError,
            message: message.into(),
        }
    }

    /// Wraps a score-scale validation failure.
    pub fn invalid_score(err: ValidationError) -> Self {
        ScoringError::InvalidScore {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ScoringError::InvalidScore { .. } => ErrorCode::InvalidScore,
            ScoringError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ScoringError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            ScoringError::AttendeeNotFound(_) => ErrorCode::AttendeeNotFound,
            ScoringError::ConsensusNotFound(_) => ErrorCode::ConsensusNotFound,
            ScoringError::ConcurrencyConflict(_) => ErrorCode::ConcurrencyConflict,
            ScoringError::FacilitatorRequired(_) => ErrorCode::FacilitatorRequired,
            ScoringError::Forbidden(_) => ErrorCode::Forbidden,
            ScoringError::Infrastructure { code, .. } => *code,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl From<ValidationError> for ScoringError {
    fn from(err: ValidationError) -> Self {
        ScoringError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<DomainError> for ScoringError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::FacilitatorRequired => ScoringError::FacilitatorRequired(err.message),
            ErrorCode::Forbidden => ScoringError::Forbidden(err.message),
            ErrorCode::ValidationFailed => ScoringError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            code => ScoringError::Infrastructure {
                code,
                message: err.message,
            },
        }
    }
}

//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' must be one of {allowed}, got {actual}")]
    NotInSet {
        field: String,
        allowed: String,
        actual: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a "value not in allowed set" validation error.
    pub fn not_in_set(
        field: impl Into<String>,
        allowed: impl Into<String>,
        actual: impl fmt::Display,
    ) -> Self {
        ValidationError::NotInSet {
            field: field.into(),
            allowed: allowed.into(),
            actual: actual.to_string(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotInSet { field, .. } => field,
        }
    }
}

/// The caller-facing kind of a failure.
///
/// Every [`ErrorCode`] belongs to exactly one category. Callers decide how
/// to react (reject input, retry, report) from the category alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    State,
    Authorization,
    Calculation,
    /// Persistence failure or timeout; safe for the caller to retry.
    Transient,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::State => "state",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Calculation => "calculation",
            ErrorCategory::Transient => "transient",
            ErrorCategory::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    TooFewItems,
    DuplicateItem,
    InvalidScore,
    InvalidVoteChoice,

    // Not found errors
    ProjectNotFound,
    ItemNotFound,
    AttendeeNotFound,
    ComparisonSetNotFound,
    ComparisonNotFound,
    ConsensusNotFound,

    // Conflict errors
    ActiveSessionExists,
    ConcurrencyConflict,

    // State errors
    InvalidStateTransition,
    SessionNotActive,

    // Authorization errors
    FacilitatorRequired,
    Forbidden,

    // Calculation errors
    DivisionByZero,
    MissingRankingInput,

    // Infrastructure errors
    DatabaseError,
    Timeout,
    InternalError,
}

impl ErrorCode {
    /// Returns the category this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            ValidationFailed | TooFewItems | DuplicateItem | InvalidScore | InvalidVoteChoice => {
                ErrorCategory::Validation
            }
            ProjectNotFound | ItemNotFound | AttendeeNotFound | ComparisonSetNotFound
            | ComparisonNotFound | ConsensusNotFound => ErrorCategory::NotFound,
            ActiveSessionExists | ConcurrencyConflict => ErrorCategory::Conflict,
            InvalidStateTransition | SessionNotActive => ErrorCategory::State,
            FacilitatorRequired | Forbidden => ErrorCategory::Authorization,
            DivisionByZero | MissingRankingInput => ErrorCategory::Calculation,
            DatabaseError | Timeout => ErrorCategory::Transient,
            InternalError => ErrorCategory::Internal,
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transient)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::TooFewItems => "TOO_FEW_ITEMS",
            ErrorCode::DuplicateItem => "DUPLICATE_ITEM",
            ErrorCode::InvalidScore => "INVALID_SCORE",
            ErrorCode::InvalidVoteChoice => "INVALID_VOTE_CHOICE",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::ItemNotFound => "ITEM_NOT_FOUND",
            ErrorCode::AttendeeNotFound => "ATTENDEE_NOT_FOUND",
            ErrorCode::ComparisonSetNotFound => "COMPARISON_SET_NOT_FOUND",
            ErrorCode::ComparisonNotFound => "COMPARISON_NOT_FOUND",
            ErrorCode::ConsensusNotFound => "CONSENSUS_NOT_FOUND",
            ErrorCode::ActiveSessionExists => "ACTIVE_SESSION_EXISTS",
            ErrorCode::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionNotActive => "SESSION_NOT_ACTIVE",
            ErrorCode::FacilitatorRequired => "FACILITATOR_REQUIRED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DivisionByZero => "DIVISION_BY_ZERO",
            ErrorCode::MissingRankingInput => "MISSING_RANKING_INPUT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates a database error from an adapter failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Returns true if the caller may retry.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("name");
        assert_eq!(format!("{}", err), "Field 'name' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("quorum_percent", 1, 100, 150);
        assert_eq!(
            format!("{}", err),
            "Field 'quorum_percent' must be between 1 and 100, got 150"
        );
    }

    #[test]
    fn validation_error_not_in_set_displays_correctly() {
        let err = ValidationError::not_in_set("score", "{1, 2, 3}", 4);
        assert_eq!(
            format!("{}", err),
            "Field 'score' must be one of {1, 2, 3}, got 4"
        );
        assert_eq!(err.field(), "score");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ComparisonNotFound, "Comparison not found");
        assert_eq!(
            format!("{}", err),
            "[COMPARISON_NOT_FOUND] Comparison not found"
        );
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "score")
            .with_detail("reason", "not fibonacci");

        assert_eq!(err.details.get("field"), Some(&"score".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"not fibonacci".to_string()));
    }

    #[test]
    fn domain_error_from_validation_error_keeps_field() {
        let err: DomainError = ValidationError::empty_field("name").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"name".to_string()));
    }

    #[test]
    fn every_code_has_expected_category() {
        assert_eq!(ErrorCode::InvalidScore.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::ComparisonNotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::ActiveSessionExists.category(), ErrorCategory::Conflict);
        assert_eq!(ErrorCode::SessionNotActive.category(), ErrorCategory::State);
        assert_eq!(ErrorCode::FacilitatorRequired.category(), ErrorCategory::Authorization);
        assert_eq!(ErrorCode::DivisionByZero.category(), ErrorCategory::Calculation);
        assert_eq!(ErrorCode::Timeout.category(), ErrorCategory::Transient);
    }

    #[test]
    fn only_transient_codes_are_retryable() {
        assert!(ErrorCode::Timeout.is_retryable());
        assert!(ErrorCode::DatabaseError.is_retryable());
        assert!(!ErrorCode::ConcurrencyConflict.is_retryable());
        assert!(!ErrorCode::InvalidScore.is_retryable());
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::SessionNotActive), "SESSION_NOT_ACTIVE");
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}

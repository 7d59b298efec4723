//! Ranking error types.

use thiserror::Error;

use crate::domain::foundation::{Criterion, DomainError, ErrorCategory, ErrorCode, ItemId};

/// Errors raised while computing or reading a ranking.
#[derive(Debug, Clone, Error)]
pub enum RankingError {
    #[error("Project has no items to rank")]
    NoItems,

    #[error("Item {0} has no locked consensus score")]
    MissingConsensus(ItemId),

    #[error("No {0} comparison session exists for this project")]
    MissingComparisons(Criterion),

    #[error("Item {0} has a complexity score of zero")]
    ZeroComplexityScore(ItemId),

    #[error("Item {0} has a complexity win-weight of zero")]
    ZeroComplexityWeight(ItemId),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{message}")]
    Infrastructure { code: ErrorCode, message: String },
}

impl RankingError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        RankingError::Infrastructure {
            code: ErrorCode::DatabaseError,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RankingError::NoItems => ErrorCode::ValidationFailed,
            RankingError::MissingConsensus(_) | RankingError::MissingComparisons(_) => {
                ErrorCode::MissingRankingInput
            }
            RankingError::ZeroComplexityScore(_) | RankingError::ZeroComplexityWeight(_) => {
                ErrorCode::DivisionByZero
            }
            RankingError::Forbidden(_) => ErrorCode::Forbidden,
            RankingError::Infrastructure { code, .. } => *code,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl From<DomainError> for RankingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::FacilitatorRequired => {
                RankingError::Forbidden(err.message)
            }
            code => RankingError::Infrastructure {
                code,
                message: err.message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_defects_are_calculation_errors() {
        let item = ItemId::new();
        for err in [
            RankingError::MissingConsensus(item),
            RankingError::MissingComparisons(Criterion::Value),
            RankingError::ZeroComplexityScore(item),
            RankingError::ZeroComplexityWeight(item),
        ] {
            assert_eq!(err.category(), ErrorCategory::Calculation);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn timeout_is_retryable() {
        let err: RankingError = DomainError::new(ErrorCode::Timeout, "slow").into();
        assert!(err.is_retryable());
    }
}

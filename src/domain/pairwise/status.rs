//! ComparisonSetStatus: lifecycle of a pairwise comparison session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a comparison session.
///
/// One-way: `Active → Completed`. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSetStatus {
    #[default]
    Active,
    Completed,
}

impl ComparisonSetStatus {
    /// Returns true while votes may still be submitted.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, ComparisonSetStatus::Active)
    }

    /// Returns the storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonSetStatus::Active => "active",
            ComparisonSetStatus::Completed => "completed",
        }
    }
}

impl StateMachine for ComparisonSetStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ComparisonSetStatus::*;
        matches!((self, target), (Active, Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ComparisonSetStatus::Active => vec![ComparisonSetStatus::Completed],
            ComparisonSetStatus::Completed => vec![],
        }
    }
}

impl fmt::Display for ComparisonSetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonSetStatus::Active => "Active",
            ComparisonSetStatus::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ComparisonSetStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ComparisonSetStatus::Active),
            "completed" => Ok(ComparisonSetStatus::Completed),
            other => Err(ValidationError::not_in_set(
                "status",
                "{active, completed}",
                other,
            )),
        }
    }
}

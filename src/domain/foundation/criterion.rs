//! Criterion enum: the two independent comparison dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// A comparison and scoring dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Relative business value of an item.
    Value,
    /// Relative implementation complexity of an item.
    Complexity,
}

impl Criterion {
    /// Both criteria, in a stable order.
    pub const ALL: [Criterion; 2] = [Criterion::Value, Criterion::Complexity];

    /// Returns the storage/wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Value => "value",
            Criterion::Complexity => "complexity",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "value" => Ok(Criterion::Value),
            "complexity" => Ok(Criterion::Complexity),
            other => Err(ValidationError::not_in_set(
                "criterion",
                "{value, complexity}",
                other,
            )),
        }
    }
}

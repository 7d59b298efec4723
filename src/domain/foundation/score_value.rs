//! ScoreValue value object: the restricted Fibonacci-like magnitude scale.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Every value an absolute score may take.
pub const SCORE_SCALE: [u32; 10] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

const SCALE_LABEL: &str = "{1, 2, 3, 5, 8, 13, 21, 34, 55, 89}";

/// An absolute magnitude score guaranteed to lie on [`SCORE_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ScoreValue(u32);

impl ScoreValue {
    /// Validates an integer against the scale.
    pub fn try_from_i64(value: i64) -> Result<Self, ValidationError> {
        SCORE_SCALE
            .iter()
            .copied()
            .find(|allowed| i64::from(*allowed) == value)
            .map(ScoreValue)
            .ok_or_else(|| ValidationError::not_in_set("score", SCALE_LABEL, value))
    }

    /// Validates a possibly fractional number against the scale.
    ///
    /// Fractions, NaN and infinities are rejected outright.
    pub fn try_from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(ValidationError::not_in_set("score", SCALE_LABEL, value));
        }
        Self::try_from_i64(value as i64)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the value as a float for ranking arithmetic.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<i64> for ScoreValue {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_from_i64(value)
    }
}

impl From<ScoreValue> for u32 {
    fn from(score: ScoreValue) -> Self {
        score.0
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

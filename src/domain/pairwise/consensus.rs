//! Consensus detection for a single head-to-head comparison.
//!
//! A comparison resolves only when enough expected voters have a live vote
//! AND every live vote agrees. Disagreement keeps the comparison open, no
//! matter how many votes are in.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttendeeId, ItemId, ValidationError};

use super::vote::{Vote, VoteChoice};

/// Derived state of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Unresolved,
    AWins,
    BWins,
    Tie,
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::Unresolved)
    }

    /// Win credit awarded to item A and item B respectively.
    ///
    /// Resolved outcomes always award exactly 1.0 in total.
    pub fn credits(&self) -> (f64, f64) {
        match self {
            Outcome::Unresolved => (0.0, 0.0),
            Outcome::AWins => (1.0, 0.0),
            Outcome::BWins => (0.0, 1.0),
            Outcome::Tie => (0.5, 0.5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unresolved => "unresolved",
            Outcome::AWins => "a_wins",
            Outcome::BWins => "b_wins",
            Outcome::Tie => "tie",
        }
    }

    /// Parses the storage name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "unresolved" => Ok(Outcome::Unresolved),
            "a_wins" => Ok(Outcome::AWins),
            "b_wins" => Ok(Outcome::BWins),
            "tie" => Ok(Outcome::Tie),
            other => Err(ValidationError::not_in_set(
                "outcome",
                "{unresolved, a_wins, b_wins, tie}",
                other,
            )),
        }
    }
}

/// How many expected voters must weigh in before a comparison can resolve.
///
/// `quorum_percent = 100` is strict unanimity: every expected voter must
/// have a live vote and all of them must agree. Lower values let a
/// comparison resolve once that share of expected voters has voted, still
/// requiring every live vote to agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRule {
    quorum_percent: u8,
}

impl ConsensusRule {
    pub const UNANIMOUS_PERCENT: u8 = 100;

    /// Creates a rule, rejecting percentages outside 1..=100.
    pub fn new(quorum_percent: u8) -> Result<Self, ValidationError> {
        if quorum_percent == 0 || quorum_percent > Self::UNANIMOUS_PERCENT {
            return Err(ValidationError::out_of_range(
                "quorum_percent",
                1,
                i64::from(Self::UNANIMOUS_PERCENT),
                i64::from(quorum_percent),
            ));
        }
        Ok(Self { quorum_percent })
    }

    /// Every expected voter must vote.
    pub fn unanimous() -> Self {
        Self {
            quorum_percent: Self::UNANIMOUS_PERCENT,
        }
    }

    pub fn quorum_percent(&self) -> u8 {
        self.quorum_percent
    }

    /// Minimum number of live votes needed out of `expected` voters.
    ///
    /// Rounds up and never drops below one.
    pub fn required_votes(&self, expected: usize) -> usize {
        let scaled = expected * usize::from(self.quorum_percent);
        ((scaled + 99) / 100).max(1)
    }

    /// Derives the outcome of a comparison between `item_a` and `item_b`.
    ///
    /// Only votes cast by `expected_voters` count.
    pub fn evaluate(
        &self,
        item_a: ItemId,
        item_b: ItemId,
        votes: &[Vote],
        expected_voters: &[AttendeeId],
    ) -> Outcome {
        let counted: Vec<&VoteChoice> = votes
            .iter()
            .filter(|vote| expected_voters.contains(&vote.attendee_id))
            .map(|vote| &vote.choice)
            .collect();

        if expected_voters.is_empty() || counted.len() < self.required_votes(expected_voters.len())
        {
            return Outcome::Unresolved;
        }

        let first = counted[0];
        if counted.iter().any(|choice| *choice != first) {
            return Outcome::Unresolved;
        }

        match first {
            VoteChoice::Tie => Outcome::Tie,
            VoteChoice::Prefer(item) if *item == item_a => Outcome::AWins,
            VoteChoice::Prefer(item) if *item == item_b => Outcome::BWins,
            VoteChoice::Prefer(_) => Outcome::Unresolved,
        }
    }
}

impl Default for ConsensusRule {
    fn default() -> Self {
        Self::unanimous()
    }
}

//! Comparison entity: one unordered item pair and its live votes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendeeId, ComparisonId, ComparisonSetId, ItemId, Timestamp,
};

use super::consensus::{ConsensusRule, Outcome};
use super::errors::PairwiseError;
use super::vote::{Vote, VoteChoice};

/// A head-to-head comparison between two items.
///
/// # Invariants
///
/// - `item_a != item_b`
/// - at most one vote per attendee; a repeat vote replaces the old one
/// - `outcome` is always the rule's verdict over the current votes
/// - `version` increases by one on every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    id: ComparisonId,
    set_id: ComparisonSetId,
    /// Zero-based ordinal within the set, in schedule order.
    position: u32,
    item_a: ItemId,
    item_b: ItemId,
    votes: Vec<Vote>,
    outcome: Outcome,
    resolved_at: Option<Timestamp>,
    version: u32,
}

/// What a single vote did to a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteApplied {
    /// The attendee's previous choice, if this vote replaced one.
    pub replaced: Option<VoteChoice>,
    pub previous_outcome: Outcome,
    pub outcome: Outcome,
}

impl VoteApplied {
    /// True when this vote moved the comparison from open to resolved.
    pub fn newly_resolved(&self) -> bool {
        !self.previous_outcome.is_resolved() && self.outcome.is_resolved()
    }

    pub fn outcome_changed(&self) -> bool {
        self.previous_outcome != self.outcome
    }
}

impl Comparison {
    /// Creates an unvoted comparison.
    pub fn new(set_id: ComparisonSetId, position: u32, item_a: ItemId, item_b: ItemId) -> Self {
        Self {
            id: ComparisonId::new(),
            set_id,
            position,
            item_a,
            item_b,
            votes: Vec::new(),
            outcome: Outcome::Unresolved,
            resolved_at: None,
            version: 0,
        }
    }

    /// Reconstitute a comparison from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ComparisonId,
        set_id: ComparisonSetId,
        position: u32,
        item_a: ItemId,
        item_b: ItemId,
        votes: Vec<Vote>,
        outcome: Outcome,
        resolved_at: Option<Timestamp>,
        version: u32,
    ) -> Self {
        Self {
            id,
            set_id,
            position,
            item_a,
            item_b,
            votes,
            outcome,
            resolved_at,
            version,
        }
    }

    pub fn id(&self) -> &ComparisonId {
        &self.id
    }

    pub fn set_id(&self) -> &ComparisonSetId {
        &self.set_id
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn item_a(&self) -> ItemId {
        self.item_a
    }

    pub fn item_b(&self) -> ItemId {
        self.item_b
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn consensus_reached(&self) -> bool {
        self.outcome.is_resolved()
    }

    pub fn resolved_at(&self) -> Option<&Timestamp> {
        self.resolved_at.as_ref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns true if `item` is one of the two compared items.
    pub fn involves(&self, item: &ItemId) -> bool {
        &self.item_a == item || &self.item_b == item
    }

    /// Returns the winning item, if the comparison resolved to a win.
    pub fn winner(&self) -> Option<ItemId> {
        match self.outcome {
            Outcome::AWins => Some(self.item_a),
            Outcome::BWins => Some(self.item_b),
            Outcome::Tie | Outcome::Unresolved => None,
        }
    }

    /// Returns the live vote of `attendee`.
    pub fn vote_of(&self, attendee: &AttendeeId) -> Option<&Vote> {
        self.votes.iter().find(|vote| &vote.attendee_id == attendee)
    }

    /// Upserts the attendee's vote and re-derives the outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidChoice` if the preferred item is not part of this pair
    pub fn record_vote(
        &mut self,
        attendee_id: AttendeeId,
        choice: VoteChoice,
        rule: &ConsensusRule,
        expected_voters: &[AttendeeId],
    ) -> Result<VoteApplied, PairwiseError> {
        if let VoteChoice::Prefer(item) = choice {
            if !self.involves(&item) {
                return Err(PairwiseError::InvalidChoice(format!(
                    "item {} is not part of comparison {}",
                    item, self.id
                )));
            }
        }

        let vote = Vote::new(attendee_id, choice);
        let replaced = match self
            .votes
            .iter_mut()
            .find(|existing| existing.attendee_id == attendee_id)
        {
            Some(existing) => Some(std::mem::replace(existing, vote).choice),
            None => {
                self.votes.push(vote);
                None
            }
        };

        let previous_outcome = self.outcome;
        self.reevaluate(rule, expected_voters);
        self.version += 1;

        Ok(VoteApplied {
            replaced,
            previous_outcome,
            outcome: self.outcome,
        })
    }

    /// Clears every vote and reopens the comparison.
    ///
    /// Returns the number of votes discarded.
    pub fn reset(&mut self) -> usize {
        let cleared = self.votes.len();
        self.votes.clear();
        self.outcome = Outcome::Unresolved;
        self.resolved_at = None;
        self.version += 1;
        cleared
    }

    fn reevaluate(&mut self, rule: &ConsensusRule, expected_voters: &[AttendeeId]) {
        let outcome = rule.evaluate(self.item_a, self.item_b, &self.votes, expected_voters);
        if outcome.is_resolved() {
            if outcome != self.outcome {
                self.resolved_at = Some(Timestamp::now());
            }
        } else {
            self.resolved_at = None;
        }
        self.outcome = outcome;
    }
}

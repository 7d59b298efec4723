//! Comparison scheduler: exhaustive unordered pair generation.

use std::collections::HashSet;

use crate::domain::foundation::{AttendeeId, Criterion, ItemId, ProjectId};

use super::comparison::Comparison;
use super::comparison_set::ComparisonSet;
use super::consensus::ConsensusRule;
use super::errors::PairwiseError;

/// Minimum number of items a session can compare.
pub const MIN_ITEMS: usize = 2;

/// Number of unique unordered pairs among `n` items.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Every unordered pair of `items`, in a fixed order.
///
/// For items `[i0, i1, i2]` this yields `(i0,i1), (i0,i2), (i1,i2)`: the
/// same input order always produces the same schedule.
pub fn generate_pairs(items: &[ItemId]) -> Vec<(ItemId, ItemId)> {
    let mut pairs = Vec::with_capacity(pair_count(items.len()));
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            pairs.push((*a, *b));
        }
    }
    pairs
}

/// A freshly scheduled session and its comparisons.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub set: ComparisonSet,
    pub comparisons: Vec<Comparison>,
}

/// Builds a new active session comparing `items` on `criterion`.
///
/// # Errors
///
/// - `TooFewItems` for fewer than two items
/// - `DuplicateItem` if an item is listed twice
/// - `NoExpectedVoters` if nobody could ever vote
pub fn schedule(
    project_id: ProjectId,
    criterion: Criterion,
    items: &[ItemId],
    expected_voters: Vec<AttendeeId>,
    rule: ConsensusRule,
) -> Result<Schedule, PairwiseError> {
    if items.len() < MIN_ITEMS {
        return Err(PairwiseError::TooFewItems { count: items.len() });
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(*item) {
            return Err(PairwiseError::DuplicateItem(*item));
        }
    }

    if expected_voters.is_empty() {
        return Err(PairwiseError::NoExpectedVoters);
    }

    let set = ComparisonSet::new(project_id, criterion, items.to_vec(), expected_voters, rule);
    let comparisons = generate_pairs(items)
        .into_iter()
        .enumerate()
        .map(|(position, (a, b))| Comparison::new(*set.id(), position as u32, a, b))
        .collect();

    Ok(Schedule { set, comparisons })
}

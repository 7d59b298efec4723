//! Win-weight aggregation.
//!
//! `WinWeight(X) = (wins + 0.5 * ties) / (N - 1)` over the resolved
//! comparisons involving X. The denominator is always the full number of
//! opponents, so an unresolved comparison counts as a zero-credit result
//! and a partial session can only under-weight an item, never inflate it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ItemId;

use super::comparison::Comparison;
use super::consensus::Outcome;

/// Resolved wins and ties for one item in one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinTally {
    pub wins: u32,
    pub ties: u32,
}

impl WinTally {
    /// Total credit: each win counts 1, each tie 0.5.
    pub fn credit(&self) -> f64 {
        f64::from(self.wins) + 0.5 * f64::from(self.ties)
    }
}

/// One item's win-weight on one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemWinWeight {
    pub item_id: ItemId,
    pub wins: u32,
    pub ties: u32,
    /// Always within `[0, 1]`.
    pub weight: f64,
}

/// Win-weight of a tally in a set of `item_count` items.
///
/// Returns 0 for sets too small to hold a comparison.
pub fn win_weight(tally: WinTally, item_count: usize) -> f64 {
    if item_count < 2 {
        return 0.0;
    }
    let opponents = (item_count - 1) as f64;
    (tally.credit() / opponents).clamp(0.0, 1.0)
}

/// Counts resolved wins and ties per item.
pub fn tally(comparisons: &[Comparison]) -> HashMap<ItemId, WinTally> {
    let mut tallies: HashMap<ItemId, WinTally> = HashMap::new();
    for comparison in comparisons {
        let (a, b) = (comparison.item_a(), comparison.item_b());
        match comparison.outcome() {
            Outcome::AWins => tallies.entry(a).or_default().wins += 1,
            Outcome::BWins => tallies.entry(b).or_default().wins += 1,
            Outcome::Tie => {
                tallies.entry(a).or_default().ties += 1;
                tallies.entry(b).or_default().ties += 1;
            }
            Outcome::Unresolved => {}
        }
    }
    tallies
}

/// Win-weights for every item of a set, in the set's item order.
///
/// Items missing from `tallies` have no resolved results and weigh 0.
pub fn compute_weights(
    item_ids: &[ItemId],
    tallies: &HashMap<ItemId, WinTally>,
) -> Vec<ItemWinWeight> {
    item_ids
        .iter()
        .map(|item_id| {
            let tally = tallies.get(item_id).copied().unwrap_or_default();
            ItemWinWeight {
                item_id: *item_id,
                wins: tally.wins,
                ties: tally.ties,
                weight: win_weight(tally, item_ids.len()),
            }
        })
        .collect()
}

//! Ranking calculator.
//!
//! ```text
//! weighted_value      = s_value      * win_weight_value
//! weighted_complexity = s_complexity * win_weight_complexity
//! final_score         = weighted_value / weighted_complexity
//! ```
//!
//! Ordering is a total order: final score descending, then `s_value`
//! descending, `s_complexity` ascending, item name ascending and finally
//! item id. Final scores are compared after quantizing to
//! [`SCORE_RESOLUTION`] so values that differ only by floating-point noise
//! fall through to the tie-breaks.

use std::cmp::Ordering;

use crate::domain::foundation::ItemId;
use crate::domain::scoring::LockedValues;

use super::errors::RankingError;
use super::result::RankingResult;

/// Final scores closer than this compare equal.
pub const SCORE_RESOLUTION: f64 = 1e-9;

/// Everything the calculator needs to know about one item.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingInput {
    pub item_id: ItemId,
    pub item_name: String,
    pub consensus: Option<LockedValues>,
    pub win_weight_value: f64,
    pub win_weight_complexity: f64,
}

/// Computes and orders the ranking for `inputs`.
///
/// Fails on the first defective item without producing any result.
///
/// # Errors
///
/// - `NoItems` when `inputs` is empty
/// - `MissingConsensus` when an item has no locked score
/// - `ZeroComplexityScore` / `ZeroComplexityWeight` when the divisor is zero
pub fn calculate(inputs: &[RankingInput]) -> Result<Vec<RankingResult>, RankingError> {
    if inputs.is_empty() {
        return Err(RankingError::NoItems);
    }

    let mut results = inputs
        .iter()
        .map(score_item)
        .collect::<Result<Vec<_>, _>>()?;

    results.sort_by(ranking_order);
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index as u32 + 1;
    }
    Ok(results)
}

fn score_item(input: &RankingInput) -> Result<RankingResult, RankingError> {
    let consensus = input
        .consensus
        .ok_or(RankingError::MissingConsensus(input.item_id))?;
    if consensus.s_complexity == 0 {
        return Err(RankingError::ZeroComplexityScore(input.item_id));
    }
    if input.win_weight_complexity <= 0.0 {
        return Err(RankingError::ZeroComplexityWeight(input.item_id));
    }

    let weighted_value = f64::from(consensus.s_value) * input.win_weight_value;
    let weighted_complexity = f64::from(consensus.s_complexity) * input.win_weight_complexity;

    Ok(RankingResult {
        item_id: input.item_id,
        item_name: input.item_name.clone(),
        win_weight_value: input.win_weight_value,
        win_weight_complexity: input.win_weight_complexity,
        s_value: consensus.s_value,
        s_complexity: consensus.s_complexity,
        weighted_value,
        weighted_complexity,
        final_score: weighted_value / weighted_complexity,
        rank: 0,
    })
}

fn score_key(score: f64) -> i64 {
    (score / SCORE_RESOLUTION).round() as i64
}

/// The ranking's total order; `Less` means `a` ranks higher.
pub fn ranking_order(a: &RankingResult, b: &RankingResult) -> Ordering {
    score_key(b.final_score)
        .cmp(&score_key(a.final_score))
        .then_with(|| b.s_value.cmp(&a.s_value))
        .then_with(|| a.s_complexity.cmp(&b.s_complexity))
        .then_with(|| a.item_name.cmp(&b.item_name))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

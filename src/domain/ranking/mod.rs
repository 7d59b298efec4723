//! Ranking domain module.
//!
//! Combines win-weights and locked consensus scores into one ordered,
//! fully deterministic ranking per project.

mod calculator;
mod errors;
mod events;
mod result;

pub use calculator::{calculate, ranking_order, RankingInput, SCORE_RESOLUTION};
pub use errors::RankingError;
pub use events::{RankedItem, RankingCalculated};
pub use result::{RankingResult, RankingSet};

//! Ranking command and query handlers.

mod calculate_ranking;
mod get_ranking;

pub use calculate_ranking::{
    CalculateRankingCommand, CalculateRankingHandler, CalculateRankingResult,
};
pub use get_ranking::{GetRankingHandler, GetRankingQuery};

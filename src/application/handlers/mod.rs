//! Application handlers.
//!
//! Grouped by domain module:
//! - `pairwise` - Comparison sessions, votes and win-weights
//! - `scoring` - Score entries and consensus locks
//! - `ranking` - Ranking calculation and lookup

pub mod pairwise;
pub mod ranking;
pub mod scoring;

#[cfg(test)]
pub(crate) mod test_support;

pub use pairwise::{
    ComparisonProgress, GetComparisonProgressHandler, GetComparisonProgressQuery,
    GetWinWeightsHandler, GetWinWeightsQuery, InvalidateItemComparisonsCommand,
    InvalidateItemComparisonsHandler, InvalidateItemComparisonsResult, OpenComparison,
    StartSessionCommand, StartSessionHandler, StartSessionResult, SubmitVoteCommand,
    SubmitVoteHandler, SubmitVoteResult, WinWeightsView, DEFAULT_MAX_VOTE_RETRIES,
};
pub use ranking::{
    CalculateRankingCommand, CalculateRankingHandler, CalculateRankingResult, GetRankingHandler,
    GetRankingQuery,
};
pub use scoring::{
    GetScoreSummaryHandler, GetScoreSummaryQuery, LockConsensusCommand, LockConsensusHandler,
    LockConsensusResult, SubmitScoreCommand, SubmitScoreHandler, SubmitScoreResult,
    UnlockConsensusCommand, UnlockConsensusHandler,
};

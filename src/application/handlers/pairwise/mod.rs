//! Pairwise comparison command and query handlers.

mod get_progress;
mod get_win_weights;
mod invalidate_item;
mod start_session;
mod submit_vote;

pub use get_progress::{
    ComparisonProgress, GetComparisonProgressHandler, GetComparisonProgressQuery, OpenComparison,
};
pub use get_win_weights::{GetWinWeightsHandler, GetWinWeightsQuery, WinWeightsView};
pub use invalidate_item::{
    InvalidateItemComparisonsCommand, InvalidateItemComparisonsHandler,
    InvalidateItemComparisonsResult,
};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
pub use submit_vote::{
    SubmitVoteCommand, SubmitVoteHandler, SubmitVoteResult, DEFAULT_MAX_VOTE_RETRIES,
};

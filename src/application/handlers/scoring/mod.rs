//! Score consensus command and query handlers.

mod get_score_summary;
mod lock_consensus;
mod submit_score;
mod unlock_consensus;

pub use get_score_summary::{GetScoreSummaryHandler, GetScoreSummaryQuery};
pub use lock_consensus::{LockConsensusCommand, LockConsensusHandler, LockConsensusResult};
pub use submit_score::{SubmitScoreCommand, SubmitScoreHandler, SubmitScoreResult};
pub use unlock_consensus::{UnlockConsensusCommand, UnlockConsensusHandler};

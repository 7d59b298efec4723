//! Scoring domain module.
//!
//! Attendees submit absolute scores per item and criterion. A facilitator
//! then locks one authoritative score pair per item, which is what the
//! ranking consumes.

mod consensus_score;
mod errors;
mod events;
mod score_entry;
mod summary;

pub use consensus_score::{ConsensusScore, LockedValues};
pub use errors::ScoringError;
pub use events::{ConsensusLocked, ConsensusUnlocked, ScoreRecorded};
pub use score_entry::{normalize_rationale, ScoreEntry, MAX_RATIONALE_LENGTH};
pub use summary::{summarize, ScoreSummary};

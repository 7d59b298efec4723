//! Pairwise domain module.
//!
//! Schedules head-to-head comparisons, aggregates votes into per-comparison
//! consensus and derives per-item win-weights.
//!
//! # Module Structure
//!
//! - `comparison_set` - Session header and its one-way lifecycle
//! - `comparison` - One item pair with its live votes
//! - `consensus` - Outcome derivation under a quorum rule
//! - `scheduler` - Exhaustive, deterministic pair generation
//! - `win_weight` - Win/tie tallies and weights

mod comparison;
mod comparison_set;
mod consensus;
mod errors;
mod events;
pub mod scheduler;
mod status;
mod vote;
pub mod win_weight;

pub use comparison::{Comparison, VoteApplied};
pub use comparison_set::ComparisonSet;
pub use consensus::{ConsensusRule, Outcome};
pub use errors::PairwiseError;
pub use events::{
    ComparisonResolved, ComparisonSessionStarted, ComparisonSetCompleted,
    ComparisonsInvalidated, VoteRecorded,
};
pub use scheduler::{schedule, Schedule};
pub use status::ComparisonSetStatus;
pub use vote::{Vote, VoteChoice};
pub use win_weight::{ItemWinWeight, WinTally};

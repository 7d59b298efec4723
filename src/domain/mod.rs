//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, score scale, errors, events)
//! - `registry` - Items and attendees supplied by the external registry
//! - `pairwise` - Comparison scheduling, vote consensus, win-weights
//! - `scoring` - Absolute score entries and locked consensus scores
//! - `ranking` - Final score computation and deterministic ordering

pub mod foundation;
pub mod pairwise;
pub mod ranking;
pub mod registry;
pub mod scoring;

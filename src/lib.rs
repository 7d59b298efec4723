//! Priority Workshop - Decision aggregation for feature-prioritization workshops
//!
//! Attendees compare candidate items pairwise on value and complexity, and
//! submit absolute scores that a facilitator locks as consensus. The engine
//! turns both into win-weights, and then into one deterministic ranking.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

//! Decision engine tuning

use serde::Deserialize;

use crate::domain::pairwise::ConsensusRule;

use super::error::ValidationError;

/// Engine behavior knobs
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Share of expected voters that must vote before a comparison can
    /// resolve. 100 means strict unanimity.
    #[serde(default = "default_quorum_percent")]
    pub quorum_percent: u8,

    /// How often a vote is re-applied after losing a version race
    #[serde(default = "default_max_vote_retries")]
    pub max_vote_retries: u32,
}

impl EngineConfig {
    /// The consensus rule new sessions are started with
    pub fn consensus_rule(&self) -> Result<ConsensusRule, ValidationError> {
        ConsensusRule::new(self.quorum_percent)
            .map_err(|_| ValidationError::InvalidQuorum(self.quorum_percent))
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.consensus_rule()?;
        if self.max_vote_retries == 0 || self.max_vote_retries > 50 {
            return Err(ValidationError::InvalidRetryLimit(self.max_vote_retries));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quorum_percent: default_quorum_percent(),
            max_vote_retries: default_max_vote_retries(),
        }
    }
}

fn default_quorum_percent() -> u8 {
    ConsensusRule::UNANIMOUS_PERCENT
}

fn default_max_vote_retries() -> u32 {
    5
}

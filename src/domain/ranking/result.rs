//! Ranking results.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttendeeId, ItemId, ProjectId, Timestamp};

/// One item's row in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub item_id: ItemId,
    pub item_name: String,
    pub win_weight_value: f64,
    pub win_weight_complexity: f64,
    pub s_value: u32,
    pub s_complexity: u32,
    pub weighted_value: f64,
    pub weighted_complexity: f64,
    pub final_score: f64,
    /// 1-based position in the ranking.
    pub rank: u32,
}

/// A project's complete ranking, stored and replaced as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSet {
    pub project_id: ProjectId,
    pub results: Vec<RankingResult>,
    pub calculated_by: AttendeeId,
    pub calculated_at: Timestamp,
}

impl RankingSet {
    pub fn new(project_id: ProjectId, results: Vec<RankingResult>, calculated_by: AttendeeId) -> Self {
        Self {
            project_id,
            results,
            calculated_by,
            calculated_at: Timestamp::now(),
        }
    }

    /// The top-ranked item.
    pub fn leader(&self) -> Option<&RankingResult> {
        self.results.first()
    }

    pub fn result_for(&self, item_id: &ItemId) -> Option<&RankingResult> {
        self.results.iter().find(|r| &r.item_id == item_id)
    }
}

//! Ranking domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, AttendeeId, EventId, ItemId, ProjectId, Timestamp};

use super::result::RankingSet;

/// Rank and score of one item, as broadcast with a new ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub item_id: ItemId,
    pub rank: u32,
    pub final_score: f64,
}

/// Published after a ranking replaced the project's previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingCalculated {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub calculated_by: AttendeeId,
    pub ranking: Vec<RankedItem>,
    pub calculated_at: Timestamp,
}

domain_event!(
    RankingCalculated,
    event_type = "ranking.calculated.v1",
    schema_version = 1,
    aggregate_id = project_id,
    aggregate_type = "RankingSet",
    occurred_at = calculated_at,
    event_id = event_id
);

impl RankingCalculated {
    pub fn from_set(set: &RankingSet) -> Self {
        Self {
            event_id: EventId::new(),
            project_id: set.project_id,
            calculated_by: set.calculated_by,
            ranking: set
                .results
                .iter()
                .map(|r| RankedItem {
                    item_id: r.item_id,
                    rank: r.rank,
                    final_score: r.final_score,
                })
                .collect(),
            calculated_at: set.calculated_at,
        }
    }
}

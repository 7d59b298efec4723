//! GetRankingHandler - Returns the last stored ranking.

use std::sync::Arc;

use crate::domain::foundation::ProjectId;
use crate::domain::ranking::{RankingError, RankingSet};
use crate::ports::RankingRepository;

#[derive(Debug, Clone)]
pub struct GetRankingQuery {
    pub project_id: ProjectId,
}

pub struct GetRankingHandler {
    rankings: Arc<dyn RankingRepository>,
}

impl GetRankingHandler {
    pub fn new(rankings: Arc<dyn RankingRepository>) -> Self {
        Self { rankings }
    }

    /// `None` until the first successful calculation.
    pub async fn handle(&self, query: GetRankingQuery) -> Result<Option<RankingSet>, RankingError> {
        Ok(self.rankings.find(&query.project_id).await?)
    }
}

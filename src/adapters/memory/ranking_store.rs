//! In-memory ranking store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::ranking::RankingSet;
use crate::ports::RankingRepository;

/// Each project's ranking is swapped as a whole under the write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRankingStore {
    rankings: Arc<RwLock<HashMap<ProjectId, RankingSet>>>,
}

impl InMemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankingRepository for InMemoryRankingStore {
    async fn replace(&self, ranking: &RankingSet) -> Result<(), DomainError> {
        self.rankings
            .write()
            .await
            .insert(ranking.project_id, ranking.clone());
        Ok(())
    }

    async fn find(&self, project_id: &ProjectId) -> Result<Option<RankingSet>, DomainError> {
        Ok(self.rankings.read().await.get(project_id).cloned())
    }
}

//! Ranking repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::ranking::RankingSet;

#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Replace the project's ranking with `ranking`.
    ///
    /// All-or-nothing: readers see either the old set or the new one,
    /// never a mix.
    async fn replace(&self, ranking: &RankingSet) -> Result<(), DomainError>;

    async fn find(&self, project_id: &ProjectId) -> Result<Option<RankingSet>, DomainError>;
}

//! GetScoreSummaryHandler - Distribution of submitted scores, as a facilitator aid.

use std::sync::Arc;

use crate::domain::foundation::{Criterion, ItemId, ProjectId};
use crate::domain::scoring::{summarize, ScoreSummary, ScoringError};
use crate::ports::ScoreEntryRepository;

#[derive(Debug, Clone)]
pub struct GetScoreSummaryQuery {
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub criterion: Criterion,
}

pub struct GetScoreSummaryHandler {
    entries: Arc<dyn ScoreEntryRepository>,
}

impl GetScoreSummaryHandler {
    pub fn new(entries: Arc<dyn ScoreEntryRepository>) -> Self {
        Self { entries }
    }

    /// Returns `None` when nobody has scored the item on the criterion.
    pub async fn handle(
        &self,
        query: GetScoreSummaryQuery,
    ) -> Result<Option<ScoreSummary>, ScoringError> {
        let entries: Vec<_> = self
            .entries
            .list_for_item(&query.item_id)
            .await?
            .into_iter()
            .filter(|e| e.project_id == query.project_id)
            .collect();

        Ok(summarize(query.item_id, query.criterion, &entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryScoreStore;
    use crate::application::handlers::scoring::{SubmitScoreCommand, SubmitScoreHandler};
    use crate::application::handlers::test_support::Workshop;

    #[tokio::test]
    async fn summarizes_submitted_scores() {
        let workshop = Workshop::new(&["A"], 2).await;
        let store = Arc::new(InMemoryScoreStore::new());
        let submit =
            SubmitScoreHandler::new(store.clone(), workshop.registry.clone(), workshop.emitter());

        for (voter, value) in workshop.voters().into_iter().zip([3.0, 5.0, 13.0]) {
            submit
                .handle(
                    SubmitScoreCommand {
                        item_id: workshop.item(0),
                        criterion: Criterion::Complexity,
                        value,
                        rationale: None,
                    },
                    workshop.metadata_for(voter),
                )
                .await
                .unwrap();
        }

        let summary = GetScoreSummaryHandler::new(store)
            .handle(GetScoreSummaryQuery {
                project_id: workshop.project_id,
                item_id: workshop.item(0),
                criterion: Criterion::Complexity,
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!((summary.min, summary.max), (3, 13));
        assert_eq!(summary.median, 5.0);
        assert!(!summary.unanimous);
    }

    #[tokio::test]
    async fn no_scores_yields_none() {
        let store = Arc::new(InMemoryScoreStore::new());

        let summary = GetScoreSummaryHandler::new(store)
            .handle(GetScoreSummaryQuery {
                project_id: ProjectId::new(),
                item_id: ItemId::new(),
                criterion: Criterion::Value,
            })
            .await
            .unwrap();

        assert!(summary.is_none());
    }
}

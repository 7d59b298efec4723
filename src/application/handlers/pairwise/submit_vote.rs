//! SubmitVoteHandler - Records a vote and drives comparison and set completion.
//!
//! The write path is an optimistic loop: load the comparison, apply the
//! vote, compare-and-set on its version. A lost race reloads and tries
//! again, up to a bound. Completing the set is a single conditional write
//! that also requires every comparison to be resolved, so exactly one
//! concurrent voter completes it and a racing revision keeps it open.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{CommandMetadata, ComparisonId, ErrorCode, EventId, Timestamp};
use crate::domain::pairwise::{
    Comparison, ComparisonResolved, ComparisonSet, ComparisonSetCompleted, Outcome,
    PairwiseError, VoteApplied, VoteChoice, VoteRecorded,
};
use crate::ports::ComparisonSetRepository;

/// Default bound on compare-and-set retries.
pub const DEFAULT_MAX_VOTE_RETRIES: u32 = 5;

/// The caller's vote on one comparison. The voter is the caller.
#[derive(Debug, Clone)]
pub struct SubmitVoteCommand {
    pub comparison_id: ComparisonId,
    pub choice: VoteChoice,
}

#[derive(Debug, Clone)]
pub struct SubmitVoteResult {
    pub comparison: Comparison,
    pub outcome: Outcome,
    /// The comparison moved to a (different) resolved outcome with this vote.
    pub resolved: bool,
    /// This vote completed the set.
    pub set_completed: bool,
    pub event: VoteRecorded,
}

pub struct SubmitVoteHandler {
    sets: Arc<dyn ComparisonSetRepository>,
    emitter: EventEmitter,
    max_retries: u32,
}

impl SubmitVoteHandler {
    pub fn new(sets: Arc<dyn ComparisonSetRepository>, emitter: EventEmitter) -> Self {
        Self {
            sets,
            emitter,
            max_retries: DEFAULT_MAX_VOTE_RETRIES,
        }
    }

    /// Builder: override the retry bound.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn handle(
        &self,
        cmd: SubmitVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitVoteResult, PairwiseError> {
        let (set, comparison, applied) = self.apply_with_retry(&cmd, &metadata).await?;

        tracing::debug!(
            comparison_id = %cmd.comparison_id,
            attendee_id = %metadata.attendee_id(),
            outcome = applied.outcome.as_str(),
            version = comparison.version(),
            "vote recorded"
        );

        let event = VoteRecorded {
            event_id: EventId::new(),
            comparison_id: *comparison.id(),
            set_id: *set.id(),
            project_id: *set.project_id(),
            attendee_id: metadata.attendee_id(),
            choice: cmd.choice,
            replaced: applied.replaced.is_some(),
            outcome: applied.outcome,
            vote_count: comparison.votes().len(),
            recorded_at: Timestamp::now(),
        };
        self.emitter.emit(&event, &metadata).await;

        let resolved = applied.outcome.is_resolved() && applied.outcome_changed();
        let mut set_completed = false;

        if resolved {
            let resolved_event = ComparisonResolved {
                event_id: EventId::new(),
                comparison_id: *comparison.id(),
                set_id: *set.id(),
                project_id: *set.project_id(),
                criterion: set.criterion(),
                item_a: comparison.item_a(),
                item_b: comparison.item_b(),
                outcome: applied.outcome,
                winner: comparison.winner(),
                resolved_at: comparison
                    .resolved_at()
                    .copied()
                    .unwrap_or_else(Timestamp::now),
            };
            self.emitter.emit(&resolved_event, &metadata).await;
        }

        // Also checked on unchanged resolved outcomes so that resubmitting
        // a vote finishes a completion that failed after the vote committed.
        if applied.outcome.is_resolved() {
            set_completed = self.complete_if_done(&set, &metadata).await?;
        }

        Ok(SubmitVoteResult {
            outcome: applied.outcome,
            comparison,
            resolved,
            set_completed,
            event,
        })
    }

    async fn apply_with_retry(
        &self,
        cmd: &SubmitVoteCommand,
        metadata: &CommandMetadata,
    ) -> Result<(ComparisonSet, Comparison, VoteApplied), PairwiseError> {
        let attendee_id = metadata.attendee_id();

        for attempt in 0..=self.max_retries {
            let mut comparison = self
                .sets
                .find_comparison(&cmd.comparison_id)
                .await?
                .ok_or(PairwiseError::ComparisonNotFound(cmd.comparison_id))?;

            let set = self
                .sets
                .find_set(comparison.set_id())
                .await?
                .ok_or(PairwiseError::SetNotFound(*comparison.set_id()))?;

            // Another project's comparison is indistinguishable from a missing one
            if set.project_id() != &metadata.project_id() {
                return Err(PairwiseError::ComparisonNotFound(cmd.comparison_id));
            }
            set.ensure_active()?;
            if !set.is_expected_voter(&attendee_id) {
                return Err(PairwiseError::AttendeeNotFound(attendee_id));
            }

            let expected_version = comparison.version();
            let applied =
                comparison.record_vote(attendee_id, cmd.choice, set.rule(), set.expected_voters())?;

            match self
                .sets
                .update_comparison(&comparison, expected_version)
                .await
            {
                Ok(()) => return Ok((set, comparison, applied)),
                Err(e) if e.code == ErrorCode::SessionNotActive => {
                    return Err(PairwiseError::SessionNotActive(*set.id()));
                }
                Err(e) if e.code == ErrorCode::ConcurrencyConflict => {
                    tracing::debug!(
                        comparison_id = %cmd.comparison_id,
                        attempt,
                        "vote lost a version race, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(
            comparison_id = %cmd.comparison_id,
            retries = self.max_retries,
            "vote retries exhausted"
        );
        Err(PairwiseError::ConcurrencyConflict(format!(
            "Comparison {} is under heavy contention, retry the vote",
            cmd.comparison_id
        )))
    }

    /// Completes the set once no comparison is left open.
    ///
    /// Only the caller whose conditional write wins emits the event.
    async fn complete_if_done(
        &self,
        set: &ComparisonSet,
        metadata: &CommandMetadata,
    ) -> Result<bool, PairwiseError> {
        let completed_at = Timestamp::now();
        if !self.sets.complete_if_resolved(set.id(), completed_at).await? {
            return Ok(false);
        }

        tracing::info!(
            set_id = %set.id(),
            criterion = %set.criterion(),
            "comparison set completed"
        );

        let event = ComparisonSetCompleted {
            event_id: EventId::new(),
            set_id: *set.id(),
            project_id: *set.project_id(),
            criterion: set.criterion(),
            comparison_count: set.pair_count(),
            completed_at,
        };
        self.emitter.emit(&event, metadata).await;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryComparisonStore;
    use crate::application::handlers::pairwise::{StartSessionCommand, StartSessionHandler};
    use crate::application::handlers::test_support::Workshop;
    use crate::domain::foundation::{
        AttendeeId, AuthContext, ComparisonSetId, Criterion, DomainError, ErrorCategory,
        ProjectId,
    };
    use crate::domain::pairwise::{ComparisonSetStatus, ConsensusRule};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    async fn started(
        workshop: &Workshop,
        store: &Arc<InMemoryComparisonStore>,
    ) -> (ComparisonSet, Vec<Comparison>) {
        let result = StartSessionHandler::new(
            store.clone(),
            workshop.registry.clone(),
            workshop.emitter(),
        )
        .handle(
            StartSessionCommand {
                criterion: Criterion::Value,
                item_ids: workshop.item_ids(),
            },
            workshop.facilitator_metadata(),
        )
        .await
        .unwrap();
        workshop.bus.clear();
        (result.set, result.comparisons)
    }

    async fn vote(
        handler: &SubmitVoteHandler,
        workshop: &Workshop,
        attendee: AttendeeId,
        comparison: &Comparison,
        choice: VoteChoice,
    ) -> Result<SubmitVoteResult, PairwiseError> {
        handler
            .handle(
                SubmitVoteCommand {
                    comparison_id: *comparison.id(),
                    choice,
                },
                workshop.metadata_for(attendee),
            )
            .await
    }

    #[tokio::test]
    async fn first_vote_keeps_comparison_open() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        let result = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Prefer(workshop.item(0)),
        )
        .await
        .unwrap();

        assert_eq!(result.outcome, Outcome::Unresolved);
        assert!(!result.resolved);
        assert!(workshop.bus.has_event("pairwise.vote_recorded.v1"));
        assert!(!workshop.bus.has_event("pairwise.comparison_resolved.v1"));
    }

    #[tokio::test]
    async fn last_agreeing_vote_resolves_and_completes_single_pair_set() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (set, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());
        let preferred = VoteChoice::Prefer(workshop.item(1));

        for voter in workshop.voters() {
            vote(&handler, &workshop, voter, &comparisons[0], preferred)
                .await
                .unwrap();
        }

        let stored = store.find_set(set.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ComparisonSetStatus::Completed);
        assert_eq!(
            workshop.bus.events_of_type("pairwise.comparison_resolved.v1").len(),
            1
        );
        assert_eq!(
            workshop.bus.events_of_type("pairwise.set_completed.v1").len(),
            1
        );
    }

    #[tokio::test]
    async fn revised_vote_replaces_instead_of_duplicating() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Prefer(workshop.item(0)),
        )
        .await
        .unwrap();
        let second = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Tie,
        )
        .await
        .unwrap();

        assert!(second.event.replaced);
        assert_eq!(second.comparison.votes().len(), 1);
        assert_eq!(second.event.vote_count, 1);
    }

    #[tokio::test]
    async fn disagreement_keeps_set_active() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (set, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Prefer(workshop.item(0)),
        )
        .await
        .unwrap();
        let result = vote(
            &handler,
            &workshop,
            workshop.members[0],
            &comparisons[0],
            VoteChoice::Tie,
        )
        .await
        .unwrap();

        assert_eq!(result.outcome, Outcome::Unresolved);
        let stored = store.find_set(set.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ComparisonSetStatus::Active);
    }

    #[tokio::test]
    async fn vote_for_foreign_item_is_rejected_without_mutation() {
        let workshop = Workshop::new(&["A", "B", "C"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());
        let outsider = comparisons[0].clone();
        let foreign = workshop
            .item_ids()
            .into_iter()
            .find(|id| !outsider.involves(id))
            .unwrap();

        let result = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &outsider,
            VoteChoice::Prefer(foreign),
        )
        .await;

        assert!(matches!(result, Err(PairwiseError::InvalidChoice(_))));
        let stored = store.find_comparison(outsider.id()).await.unwrap().unwrap();
        assert!(stored.votes().is_empty());
        assert_eq!(stored.version(), 0);
        assert_eq!(workshop.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn unknown_comparison_is_not_found() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        let result = handler
            .handle(
                SubmitVoteCommand {
                    comparison_id: ComparisonId::new(),
                    choice: VoteChoice::Tie,
                },
                workshop.facilitator_metadata(),
            )
            .await;

        assert_eq!(result.unwrap_err().category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn attendee_from_another_project_sees_not_found() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        let result = handler
            .handle(
                SubmitVoteCommand {
                    comparison_id: *comparisons[0].id(),
                    choice: VoteChoice::Tie,
                },
                CommandMetadata::new(AuthContext::attendee(AttendeeId::new(), ProjectId::new())),
            )
            .await;

        assert!(matches!(result, Err(PairwiseError::ComparisonNotFound(_))));
    }

    #[tokio::test]
    async fn attendee_outside_roster_snapshot_is_not_found() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());
        let late_joiner = AttendeeId::new();

        let result = handler
            .handle(
                SubmitVoteCommand {
                    comparison_id: *comparisons[0].id(),
                    choice: VoteChoice::Tie,
                },
                CommandMetadata::new(AuthContext::attendee(late_joiner, workshop.project_id)),
            )
            .await;

        assert!(matches!(result, Err(PairwiseError::AttendeeNotFound(id)) if id == late_joiner));
    }

    #[tokio::test]
    async fn completed_set_rejects_votes() {
        let workshop = Workshop::new(&["A", "B"], 0).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        let first = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Tie,
        )
        .await
        .unwrap();
        assert!(first.set_completed);

        let late = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Prefer(workshop.item(0)),
        )
        .await;

        assert!(matches!(late, Err(PairwiseError::SessionNotActive(_))));
        let stored = store.find_comparison(comparisons[0].id()).await.unwrap().unwrap();
        assert_eq!(stored.outcome(), Outcome::Tie);
    }

    #[tokio::test]
    async fn quorum_rule_resolves_before_everyone_votes() {
        let workshop = Workshop::new(&["A", "B", "C"], 3).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let result = StartSessionHandler::new(
            store.clone(),
            workshop.registry.clone(),
            workshop.emitter(),
        )
        .with_rule(ConsensusRule::new(50).unwrap())
        .handle(
            StartSessionCommand {
                criterion: Criterion::Value,
                item_ids: workshop.item_ids(),
            },
            workshop.facilitator_metadata(),
        )
        .await
        .unwrap();
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());
        let target = &result.comparisons[0];
        let winner = VoteChoice::Prefer(target.item_a());

        vote(&handler, &workshop, workshop.voters()[0], target, winner)
            .await
            .unwrap();
        let second = vote(&handler, &workshop, workshop.voters()[1], target, winner)
            .await
            .unwrap();

        assert_eq!(second.outcome, Outcome::AWins);
        assert!(second.resolved);
        assert!(!second.set_completed);
    }

    /// Store wrapper that loses the first `conflicts` compare-and-sets.
    struct Contended {
        inner: Arc<InMemoryComparisonStore>,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl ComparisonSetRepository for Contended {
        async fn create(
            &self,
            set: &ComparisonSet,
            comparisons: &[Comparison],
        ) -> Result<(), DomainError> {
            self.inner.create(set, comparisons).await
        }

        async fn find_set(
            &self,
            id: &ComparisonSetId,
        ) -> Result<Option<ComparisonSet>, DomainError> {
            self.inner.find_set(id).await
        }

        async fn find_active(
            &self,
            project_id: &ProjectId,
            criterion: Criterion,
        ) -> Result<Option<ComparisonSet>, DomainError> {
            self.inner.find_active(project_id, criterion).await
        }

        async fn find_latest(
            &self,
            project_id: &ProjectId,
            criterion: Criterion,
        ) -> Result<Option<ComparisonSet>, DomainError> {
            self.inner.find_latest(project_id, criterion).await
        }

        async fn list_active(
            &self,
            project_id: &ProjectId,
        ) -> Result<Vec<ComparisonSet>, DomainError> {
            self.inner.list_active(project_id).await
        }

        async fn find_comparison(
            &self,
            id: &ComparisonId,
        ) -> Result<Option<Comparison>, DomainError> {
            self.inner.find_comparison(id).await
        }

        async fn list_comparisons(
            &self,
            set_id: &ComparisonSetId,
        ) -> Result<Vec<Comparison>, DomainError> {
            self.inner.list_comparisons(set_id).await
        }

        async fn update_comparison(
            &self,
            comparison: &Comparison,
            expected_version: u32,
        ) -> Result<(), DomainError> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Err(DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    "simulated lost race",
                ));
            }
            self.inner.update_comparison(comparison, expected_version).await
        }

        async fn complete_if_resolved(
            &self,
            set_id: &ComparisonSetId,
            completed_at: Timestamp,
        ) -> Result<bool, DomainError> {
            self.inner.complete_if_resolved(set_id, completed_at).await
        }
    }

    #[tokio::test]
    async fn lost_race_is_retried() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let contended = Arc::new(Contended {
            inner: store.clone(),
            conflicts: AtomicU32::new(2),
        });
        let handler = SubmitVoteHandler::new(contended, workshop.emitter());

        let result = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Tie,
        )
        .await
        .unwrap();

        assert_eq!(result.comparison.version(), 1);
        let stored = store.find_comparison(comparisons[0].id()).await.unwrap().unwrap();
        assert_eq!(stored.votes().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_conflict() {
        let workshop = Workshop::new(&["A", "B"], 1).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (_, comparisons) = started(&workshop, &store).await;
        let contended = Arc::new(Contended {
            inner: store.clone(),
            conflicts: AtomicU32::new(10),
        });
        let handler = SubmitVoteHandler::new(contended, workshop.emitter()).with_max_retries(2);

        let result = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Tie,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        let stored = store.find_comparison(comparisons[0].id()).await.unwrap().unwrap();
        assert!(stored.votes().is_empty());
        assert_eq!(workshop.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn publisher_failure_does_not_fail_the_vote() {
        let workshop = Workshop::new(&["A", "B"], 0).await;
        let store = Arc::new(InMemoryComparisonStore::new());
        let (set, comparisons) = started(&workshop, &store).await;
        workshop.bus.set_failing(true);
        let handler = SubmitVoteHandler::new(store.clone(), workshop.emitter());

        let result = vote(
            &handler,
            &workshop,
            workshop.facilitator,
            &comparisons[0],
            VoteChoice::Prefer(comparisons[0].item_b()),
        )
        .await
        .unwrap();

        assert!(result.set_completed);
        let stored = store.find_set(set.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ComparisonSetStatus::Completed);
    }
}

//! Concurrency and event-delivery guarantees of the vote path.
//!
//! - Racing final votes complete a set exactly once
//! - A revision racing completion keeps the set open
//! - Writes landing after completion leave the set frozen
//! - Racing voters on one comparison are all recorded
//! - A failing publisher never fails or rolls back a vote
//! - Channel-backed publishing hands events to the dispatcher

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;

use priority_workshop::adapters::memory::{
    in_memory_ports, InMemoryComparisonStore, InMemoryRegistry,
};
use priority_workshop::adapters::{event_channel, EventDispatcher, InMemoryEventBus};
use priority_workshop::application::handlers::{
    InvalidateItemComparisonsCommand, InvalidateItemComparisonsHandler, StartSessionCommand,
    StartSessionHandler, SubmitVoteCommand, SubmitVoteHandler,
};
use priority_workshop::application::{EventEmitter, WorkshopHandlers};
use priority_workshop::config::{EngineConfig, EventsConfig};
use priority_workshop::domain::foundation::{
    AttendeeId, AuthContext, CommandMetadata, ComparisonId, ComparisonSetId, Criterion,
    DomainError, EventId, ItemId, ProjectId, Timestamp,
};
use priority_workshop::domain::pairwise::{
    Comparison, ComparisonSet, ComparisonSetStatus, PairwiseError, VoteChoice,
};
use priority_workshop::domain::registry::{Attendee, Item};
use priority_workshop::ports::{ComparisonSetRepository, PublishFailureObserver};

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Default)]
struct CountingObserver {
    failures: AtomicUsize,
}

impl PublishFailureObserver for CountingObserver {
    fn publish_failed(&self, _event_type: &str, _event_id: &EventId, _error: &DomainError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

struct Project {
    id: ProjectId,
    facilitator: AttendeeId,
    members: Vec<AttendeeId>,
    items: Vec<ItemId>,
    registry: Arc<InMemoryRegistry>,
}

impl Project {
    async fn new(item_count: usize, member_count: usize) -> Self {
        let id = ProjectId::new();
        let registry = Arc::new(InMemoryRegistry::new());
        let facilitator = AttendeeId::new();
        registry.add_attendee(Attendee::new(facilitator, id, true)).await;

        let mut members = Vec::new();
        for _ in 0..member_count {
            let member = AttendeeId::new();
            registry.add_attendee(Attendee::new(member, id, false)).await;
            members.push(member);
        }

        let mut items = Vec::new();
        for index in 0..item_count {
            let item = Item::new(ItemId::new(), id, format!("Item {}", index)).unwrap();
            items.push(item.id);
            registry.add_item(item).await;
        }

        Self {
            id,
            facilitator,
            members,
            items,
            registry,
        }
    }

    fn facilitator(&self) -> CommandMetadata {
        CommandMetadata::new(AuthContext::facilitator(self.facilitator, self.id))
    }

    fn member(&self, attendee: AttendeeId) -> CommandMetadata {
        CommandMetadata::new(AuthContext::attendee(attendee, self.id))
    }

    async fn start(
        &self,
        store: &Arc<InMemoryComparisonStore>,
        emitter: EventEmitter,
    ) -> Vec<Comparison> {
        StartSessionHandler::new(store.clone(), self.registry.clone(), emitter)
            .handle(
                StartSessionCommand {
                    criterion: Criterion::Value,
                    item_ids: self.items.clone(),
                },
                self.facilitator(),
            )
            .await
            .unwrap()
            .comparisons
    }
}

/// Where `Interleaved` lets another operation cut in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pause {
    BeforeFindComparison,
    BeforeUpdate,
    BeforeCompletion,
}

/// Store wrapper that runs `cut_in` to completion the first time the
/// wrapped caller reaches `pause`, then carries on with the real call.
struct Interleaved {
    inner: Arc<InMemoryComparisonStore>,
    pause: Pause,
    cut_in: Mutex<Option<BoxFuture<'static, ()>>>,
}

impl Interleaved {
    fn new(
        inner: Arc<InMemoryComparisonStore>,
        pause: Pause,
        cut_in: BoxFuture<'static, ()>,
    ) -> Self {
        Self {
            inner,
            pause,
            cut_in: Mutex::new(Some(cut_in)),
        }
    }

    async fn reached(&self, at: Pause) {
        if at != self.pause {
            return;
        }
        let pending = self.cut_in.lock().unwrap().take();
        if let Some(pending) = pending {
            pending.await;
        }
    }
}

#[async_trait]
impl ComparisonSetRepository for Interleaved {
    async fn create(
        &self,
        set: &ComparisonSet,
        comparisons: &[Comparison],
    ) -> Result<(), DomainError> {
        self.inner.create(set, comparisons).await
    }

    async fn find_set(&self, id: &ComparisonSetId) -> Result<Option<ComparisonSet>, DomainError> {
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

    async fn list_active(&self, project_id: &ProjectId) -> Result<Vec<ComparisonSet>, DomainError> {
        self.inner.list_active(project_id).await
    }

    async fn find_comparison(&self, id: &ComparisonId) -> Result<Option<Comparison>, DomainError> {
        self.reached(Pause::BeforeFindComparison).await;
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
        self.reached(Pause::BeforeUpdate).await;
        self.inner.update_comparison(comparison, expected_version).await
    }

    async fn complete_if_resolved(
        &self,
        set_id: &ComparisonSetId,
        completed_at: Timestamp,
    ) -> Result<bool, DomainError> {
        self.reached(Pause::BeforeCompletion).await;
        self.inner.complete_if_resolved(set_id, completed_at).await
    }
}

fn vote_on(comparison: &Comparison, choice: VoteChoice) -> SubmitVoteCommand {
    SubmitVoteCommand {
        comparison_id: *comparison.id(),
        choice,
    }
}

/// Both voters agree on the first two comparisons; only the facilitator has
/// voted on the third, so the member's agreeing vote there is the final one.
async fn nearly_complete(
    project: &Project,
    voter: &SubmitVoteHandler,
    comparisons: &[Comparison],
) {
    let member = project.member(project.members[0]);
    for comparison in &comparisons[..2] {
        let choice = VoteChoice::Prefer(comparison.item_a());
        voter
            .handle(vote_on(comparison, choice), project.facilitator())
            .await
            .unwrap();
        voter
            .handle(vote_on(comparison, choice), member.clone())
            .await
            .unwrap();
    }
    voter
        .handle(
            vote_on(&comparisons[2], VoteChoice::Prefer(comparisons[2].item_a())),
            project.facilitator(),
        )
        .await
        .unwrap();
}

async fn all_resolved(store: &InMemoryComparisonStore, set_id: &ComparisonSetId) -> bool {
    store
        .list_comparisons(set_id)
        .await
        .unwrap()
        .iter()
        .all(|c| c.consensus_reached())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_final_votes_complete_set_exactly_once() {
    // Facilitator is the only expected voter, so each vote resolves its comparison
    let project = Project::new(6, 0).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let emitter = EventEmitter::with_logging_observer(bus.clone());
    let comparisons = project.start(&store, emitter.clone()).await;
    assert_eq!(comparisons.len(), 15);

    let handler = Arc::new(SubmitVoteHandler::new(store.clone(), emitter));
    let mut tasks = Vec::new();
    for comparison in comparisons {
        let handler = handler.clone();
        let metadata = project.facilitator();
        tasks.push(tokio::spawn(async move {
            handler
                .handle(
                    SubmitVoteCommand {
                        comparison_id: *comparison.id(),
                        choice: VoteChoice::Tie,
                    },
                    metadata,
                )
                .await
        }));
    }

    let mut completions = 0;
    for task in tasks {
        if task.await.unwrap().unwrap().set_completed {
            completions += 1;
        }
    }

    assert_eq!(completions, 1);
    assert_eq!(bus.events_of_type("pairwise.set_completed.v1").len(), 1);
    assert_eq!(bus.events_of_type("pairwise.comparison_resolved.v1").len(), 15);
    let set = store
        .find_latest(&project.id, Criterion::Value)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(set.status(), ComparisonSetStatus::Completed);
}

#[tokio::test]
async fn revision_between_final_vote_and_completion_keeps_set_open() {
    let project = Project::new(3, 1).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let emitter = EventEmitter::with_logging_observer(bus.clone());
    let comparisons = project.start(&store, emitter.clone()).await;
    let set_id = *comparisons[0].set_id();
    let direct = Arc::new(SubmitVoteHandler::new(store.clone(), emitter.clone()));
    nearly_complete(&project, &direct, &comparisons).await;

    // The member backs out of the first comparison while the final vote is
    // on its way to completing the set
    let revision = {
        let direct = direct.clone();
        let command = vote_on(&comparisons[0], VoteChoice::Tie);
        let member = project.member(project.members[0]);
        async move {
            let revised = direct.handle(command, member).await.unwrap();
            assert!(!revised.outcome.is_resolved());
        }
        .boxed()
    };
    let racing = SubmitVoteHandler::new(
        Arc::new(Interleaved::new(store.clone(), Pause::BeforeCompletion, revision)),
        emitter,
    );

    let last = racing
        .handle(
            vote_on(&comparisons[2], VoteChoice::Prefer(comparisons[2].item_a())),
            project.member(project.members[0]),
        )
        .await
        .unwrap();

    assert!(last.resolved);
    assert!(!last.set_completed);
    let set = store.find_set(&set_id).await.unwrap().unwrap();
    assert_eq!(set.status(), ComparisonSetStatus::Active);
    assert!(!bus.has_event("pairwise.set_completed.v1"));
    assert!(!all_resolved(&store, &set_id).await);

    // Agreeing again finishes the set normally
    let settled = direct
        .handle(
            vote_on(&comparisons[0], VoteChoice::Prefer(comparisons[0].item_a())),
            project.member(project.members[0]),
        )
        .await
        .unwrap();
    assert!(settled.set_completed);
    assert!(all_resolved(&store, &set_id).await);
    assert_eq!(bus.events_of_type("pairwise.set_completed.v1").len(), 1);
}

#[tokio::test]
async fn revision_landing_after_completion_is_rejected() {
    let project = Project::new(3, 1).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let emitter = EventEmitter::with_logging_observer(bus.clone());
    let comparisons = project.start(&store, emitter.clone()).await;
    let set_id = *comparisons[0].set_id();
    let direct = Arc::new(SubmitVoteHandler::new(store.clone(), emitter.clone()));
    nearly_complete(&project, &direct, &comparisons).await;

    // The final vote completes the set after the revision read it as Active
    let final_vote = {
        let direct = direct.clone();
        let command = vote_on(&comparisons[2], VoteChoice::Prefer(comparisons[2].item_a()));
        let member = project.member(project.members[0]);
        async move {
            assert!(direct.handle(command, member).await.unwrap().set_completed);
        }
        .boxed()
    };
    let racing = SubmitVoteHandler::new(
        Arc::new(Interleaved::new(store.clone(), Pause::BeforeUpdate, final_vote)),
        emitter,
    );

    let revision = racing
        .handle(
            vote_on(&comparisons[0], VoteChoice::Tie),
            project.member(project.members[0]),
        )
        .await;

    assert!(matches!(revision, Err(PairwiseError::SessionNotActive(id)) if id == set_id));
    let set = store.find_set(&set_id).await.unwrap().unwrap();
    assert_eq!(set.status(), ComparisonSetStatus::Completed);
    assert!(all_resolved(&store, &set_id).await);
    let kept = store
        .find_comparison(comparisons[0].id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.winner(), Some(comparisons[0].item_a()));
    assert_eq!(bus.events_of_type("pairwise.set_completed.v1").len(), 1);
}

#[tokio::test]
async fn invalidation_racing_completion_leaves_set_frozen() {
    // Facilitator is the only expected voter
    let project = Project::new(3, 0).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let emitter = EventEmitter::with_logging_observer(bus.clone());
    let comparisons = project.start(&store, emitter.clone()).await;
    let set_id = *comparisons[0].set_id();
    let direct = Arc::new(SubmitVoteHandler::new(store.clone(), emitter.clone()));
    for comparison in &comparisons[..2] {
        direct
            .handle(vote_on(comparison, VoteChoice::Tie), project.facilitator())
            .await
            .unwrap();
    }

    // The set completes after the reset has seen it Active
    let final_vote = {
        let direct = direct.clone();
        let command = vote_on(&comparisons[2], VoteChoice::Tie);
        let metadata = project.facilitator();
        async move {
            assert!(direct.handle(command, metadata).await.unwrap().set_completed);
        }
        .boxed()
    };
    let invalidator = InvalidateItemComparisonsHandler::new(
        Arc::new(Interleaved::new(
            store.clone(),
            Pause::BeforeFindComparison,
            final_vote,
        )),
        emitter,
    );

    let result = invalidator
        .handle(
            InvalidateItemComparisonsCommand {
                item_id: comparisons[0].item_a(),
            },
            project.facilitator(),
        )
        .await
        .unwrap();

    assert_eq!(result.comparison_count(), 0);
    assert!(!bus.has_event("pairwise.comparisons_invalidated.v1"));
    let set = store.find_set(&set_id).await.unwrap().unwrap();
    assert_eq!(set.status(), ComparisonSetStatus::Completed);
    assert!(all_resolved(&store, &set_id).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_voters_on_one_comparison_are_all_recorded() {
    let project = Project::new(2, 7).await;
    let bus = Arc::new(InMemoryEventBus::new());
    let engine = EngineConfig {
        max_vote_retries: 20,
        ..EngineConfig::default()
    };
    let handlers = WorkshopHandlers::new(
        in_memory_ports(project.registry.clone()),
        &engine,
        EventEmitter::with_logging_observer(bus.clone()),
    )
    .unwrap();
    let comparison_id = *handlers
        .start_session
        .handle(
            StartSessionCommand {
                criterion: Criterion::Complexity,
                item_ids: project.items.clone(),
            },
            project.facilitator(),
        )
        .await
        .unwrap()
        .comparisons[0]
        .id();

    let winner = project.items[1];
    let voters: Vec<CommandMetadata> = std::iter::once(project.facilitator())
        .chain(project.members.iter().map(|m| project.member(*m)))
        .collect();
    let mut tasks = Vec::new();
    for metadata in voters {
        let handler = handlers.submit_vote.clone();
        tasks.push(tokio::spawn(async move {
            handler
                .handle(
                    SubmitVoteCommand {
                        comparison_id,
                        choice: VoteChoice::Prefer(winner),
                    },
                    metadata,
                )
                .await
        }));
    }

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.set_completed).count(), 1);
    assert_eq!(bus.events_of_type("pairwise.vote_recorded.v1").len(), 8);
    let last = results
        .iter()
        .max_by_key(|r| r.comparison.version())
        .unwrap();
    assert_eq!(last.comparison.votes().len(), 8);
    assert!(last.outcome.is_resolved());
    assert_eq!(last.comparison.winner(), Some(winner));
}

#[tokio::test]
async fn failing_publisher_does_not_fail_the_vote() {
    let project = Project::new(2, 0).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let observer = Arc::new(CountingObserver::default());
    let emitter = EventEmitter::new(bus.clone(), observer.clone());
    let comparisons = project.start(&store, emitter.clone()).await;

    bus.set_failing(true);
    let result = SubmitVoteHandler::new(store.clone(), emitter)
        .handle(
            SubmitVoteCommand {
                comparison_id: *comparisons[0].id(),
                choice: VoteChoice::Prefer(project.items[0]),
            },
            project.facilitator(),
        )
        .await
        .unwrap();

    assert!(result.set_completed);
    // VoteRecorded, ComparisonResolved, ComparisonSetCompleted
    assert_eq!(observer.failures.load(Ordering::SeqCst), 3);
    let stored = store
        .find_comparison(comparisons[0].id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.winner(), Some(project.items[0]));
}

#[tokio::test]
async fn channel_publisher_feeds_the_dispatcher() {
    let project = Project::new(3, 0).await;
    let store = Arc::new(InMemoryComparisonStore::new());
    let downstream = Arc::new(InMemoryEventBus::new());
    let (publisher, receiver) = event_channel(&EventsConfig::default());
    let observer = Arc::new(CountingObserver::default());
    let dispatcher = EventDispatcher::new(receiver, downstream.clone(), observer.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = tokio::spawn(dispatcher.run(shutdown_rx));

    let emitter = EventEmitter::new(Arc::new(publisher), observer.clone());
    let comparisons = project.start(&store, emitter.clone()).await;
    let voter = SubmitVoteHandler::new(store, emitter);
    for comparison in &comparisons {
        voter
            .handle(
                SubmitVoteCommand {
                    comparison_id: *comparison.id(),
                    choice: VoteChoice::Tie,
                },
                project.facilitator(),
            )
            .await
            .unwrap();
    }

    shutdown_tx.send(true).unwrap();
    let stats = running.await.unwrap();

    // Started + 3 votes + 3 resolutions + completion
    assert_eq!(stats.delivered, 8);
    assert_eq!(stats.failed, 0);
    assert_eq!(downstream.event_count(), 8);
    assert!(downstream.has_event("pairwise.set_completed.v1"));
    assert_eq!(observer.failures.load(Ordering::SeqCst), 0);
}

//! SubmitScoreHandler - Records an attendee's absolute score for an item.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{CommandMetadata, Criterion, EventId, ItemId, ScoreValue};
use crate::domain::scoring::{ScoreEntry, ScoreRecorded, ScoringError};
use crate::ports::{ScoreEntryRepository, WorkshopRegistry};

/// Command to submit or revise the caller's score.
///
/// `value` is taken as given by the caller and must be on the scale.
#[derive(Debug, Clone)]
pub struct SubmitScoreCommand {
    pub item_id: ItemId,
    pub criterion: Criterion,
    pub value: f64,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitScoreResult {
    pub entry: ScoreEntry,
    /// The entry this submission replaced.
    pub previous: Option<ScoreEntry>,
    pub event: ScoreRecorded,
}

pub struct SubmitScoreHandler {
    entries: Arc<dyn ScoreEntryRepository>,
    registry: Arc<dyn WorkshopRegistry>,
    emitter: EventEmitter,
}

impl SubmitScoreHandler {
    pub fn new(
        entries: Arc<dyn ScoreEntryRepository>,
        registry: Arc<dyn WorkshopRegistry>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            entries,
            registry,
            emitter,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitScoreCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitScoreResult, ScoringError> {
        let value = ScoreValue::try_from_f64(cmd.value).map_err(ScoringError::invalid_score)?;
        let project_id = metadata.project_id();
        let attendee_id = metadata.attendee_id();

        let roster = self
            .registry
            .roster(&project_id)
            .await?
            .ok_or(ScoringError::ItemNotFound(cmd.item_id))?;
        if roster.item(&cmd.item_id).is_none() {
            return Err(ScoringError::ItemNotFound(cmd.item_id));
        }
        if !roster.has_attendee(&attendee_id) {
            return Err(ScoringError::AttendeeNotFound(attendee_id));
        }

        let entry = ScoreEntry::new(
            project_id,
            cmd.item_id,
            attendee_id,
            cmd.criterion,
            value,
            cmd.rationale,
        )?;
        let previous = self.entries.upsert(&entry).await?;

        tracing::debug!(
            item_id = %cmd.item_id,
            attendee_id = %attendee_id,
            criterion = %cmd.criterion,
            value = value.value(),
            "score recorded"
        );

        let event = ScoreRecorded {
            event_id: EventId::new(),
            project_id,
            item_id: cmd.item_id,
            attendee_id,
            criterion: cmd.criterion,
            value: value.value(),
            previous_value: previous.as_ref().map(|p| p.value.value()),
            recorded_at: entry.recorded_at,
        };
        self.emitter.emit(&event, &metadata).await;

        Ok(SubmitScoreResult {
            entry,
            previous,
            event,
        })
    }
}

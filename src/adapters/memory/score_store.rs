//! In-memory score entry and consensus stores.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    AttendeeId, Criterion, DomainError, ErrorCode, ItemId, ProjectId,
};
use crate::domain::scoring::{ConsensusScore, ScoreEntry};
use crate::ports::{ConsensusScoreRepository, ScoreEntryRepository};

type Slot = (ItemId, AttendeeId, Criterion);

#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreStore {
    entries: Arc<RwLock<HashMap<Slot, ScoreEntry>>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ScoreEntryRepository for InMemoryScoreStore {
    async fn upsert(&self, entry: &ScoreEntry) -> Result<Option<ScoreEntry>, DomainError> {
        let slot = (entry.item_id, entry.attendee_id, entry.criterion);
        Ok(self.entries.write().await.insert(slot, entry.clone()))
    }

    async fn list_for_item(&self, item_id: &ItemId) -> Result<Vec<ScoreEntry>, DomainError> {
        let entries = self.entries.read().await;
        let mut found: Vec<ScoreEntry> = entries
            .values()
            .filter(|e| &e.item_id == item_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.criterion, e.attendee_id));
        Ok(found)
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<ScoreEntry>, DomainError> {
        let entries = self.entries.read().await;
        let mut found: Vec<ScoreEntry> = entries
            .values()
            .filter(|e| &e.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.item_id, e.criterion, e.attendee_id));
        Ok(found)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryConsensusStore {
    scores: Arc<RwLock<HashMap<ItemId, ConsensusScore>>>,
}

impl InMemoryConsensusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a score as-is, bypassing every check. For seeding fixtures.
    pub async fn put(&self, consensus: ConsensusScore) {
        self.scores
            .write()
            .await
            .insert(*consensus.item_id(), consensus);
    }
}

fn conflict(item_id: &ItemId, reason: &str) -> DomainError {
    DomainError::new(
        ErrorCode::ConcurrencyConflict,
        format!("Consensus for item {} {}", item_id, reason),
    )
}

#[async_trait]
impl ConsensusScoreRepository for InMemoryConsensusStore {
    async fn find(&self, item_id: &ItemId) -> Result<Option<ConsensusScore>, DomainError> {
        Ok(self.scores.read().await.get(item_id).cloned())
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ConsensusScore>, DomainError> {
        let scores = self.scores.read().await;
        Ok(scores
            .values()
            .filter(|c| c.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, consensus: &ConsensusScore) -> Result<(), DomainError> {
        let mut scores = self.scores.write().await;
        if scores.contains_key(consensus.item_id()) {
            return Err(conflict(consensus.item_id(), "was locked concurrently"));
        }
        scores.insert(*consensus.item_id(), consensus.clone());
        Ok(())
    }

    async fn update(
        &self,
        consensus: &ConsensusScore,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let mut scores = self.scores.write().await;
        match scores.get_mut(consensus.item_id()) {
            Some(stored) if stored.version() == expected_version => {
                *stored = consensus.clone();
                Ok(())
            }
            Some(_) => Err(conflict(consensus.item_id(), "changed concurrently")),
            None => Err(conflict(consensus.item_id(), "was unlocked concurrently")),
        }
    }

    async fn delete(&self, item_id: &ItemId, expected_version: u32) -> Result<(), DomainError> {
        let mut scores = self.scores.write().await;
        match scores.get(item_id) {
            Some(stored) if stored.version() == expected_version => {
                scores.remove(item_id);
                Ok(())
            }
            Some(_) => Err(conflict(item_id, "changed concurrently")),
            None => Err(conflict(item_id, "was unlocked concurrently")),
        }
    }
}

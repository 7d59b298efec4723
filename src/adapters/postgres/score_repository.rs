//! PostgreSQL implementations of ScoreEntryRepository and ConsensusScoreRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    AttendeeId, Criterion, DomainError, ErrorCode, ItemId, ProjectId, ScoreValue, Timestamp,
};
use crate::domain::scoring::{ConsensusScore, ScoreEntry};
use crate::ports::{ConsensusScoreRepository, ScoreEntryRepository};

use super::pool::{corrupt_row, db_error, is_unique_violation};

#[derive(Clone)]
pub struct PostgresScoreRepository {
    pool: PgPool,
}

impl PostgresScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    project_id: Uuid,
    item_id: Uuid,
    attendee_id: Uuid,
    criterion: String,
    value: i32,
    rationale: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Result<ScoreEntry, DomainError> {
        let criterion: Criterion = self
            .criterion
            .parse()
            .map_err(|e| corrupt_row("score_entries", e))?;
        let value = ScoreValue::try_from_i64(i64::from(self.value))
            .map_err(|e| corrupt_row("score_entries", e))?;

        Ok(ScoreEntry {
            project_id: ProjectId::from_uuid(self.project_id),
            item_id: ItemId::from_uuid(self.item_id),
            attendee_id: AttendeeId::from_uuid(self.attendee_id),
            criterion,
            value,
            rationale: self.rationale,
            recorded_at: Timestamp::from_datetime(self.recorded_at),
        })
    }
}

#[async_trait]
impl ScoreEntryRepository for PostgresScoreRepository {
    async fn upsert(&self, entry: &ScoreEntry) -> Result<Option<ScoreEntry>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let previous = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT project_id, item_id, attendee_id, criterion, value, rationale, recorded_at
            FROM score_entries
            WHERE item_id = $1 AND attendee_id = $2 AND criterion = $3
            FOR UPDATE
            "#,
        )
        .bind(entry.item_id.as_uuid())
        .bind(entry.attendee_id.as_uuid())
        .bind(entry.criterion.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load score entry", e))?;

        sqlx::query(
            r#"
            INSERT INTO score_entries (
                project_id, item_id, attendee_id, criterion, value, rationale, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (item_id, attendee_id, criterion) DO UPDATE SET
                value = EXCLUDED.value,
                rationale = EXCLUDED.rationale,
                recorded_at = EXCLUDED.recorded_at
            "#,
        )
        .bind(entry.project_id.as_uuid())
        .bind(entry.item_id.as_uuid())
        .bind(entry.attendee_id.as_uuid())
        .bind(entry.criterion.as_str())
        .bind(entry.value.value() as i32)
        .bind(entry.rationale.as_deref())
        .bind(entry.recorded_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to upsert score entry", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit score entry", e))?;

        previous.map(EntryRow::into_entry).transpose()
    }

    async fn list_for_item(&self, item_id: &ItemId) -> Result<Vec<ScoreEntry>, DomainError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT project_id, item_id, attendee_id, criterion, value, rationale, recorded_at
            FROM score_entries
            WHERE item_id = $1
            ORDER BY recorded_at
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load score entries", e))?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<ScoreEntry>, DomainError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT project_id, item_id, attendee_id, criterion, value, rationale, recorded_at
            FROM score_entries
            WHERE project_id = $1
            ORDER BY recorded_at
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load score entries", e))?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }
}

#[derive(Clone)]
pub struct PostgresConsensusRepository {
    pool: PgPool,
}

impl PostgresConsensusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Turns a missed compare-and-set into the right error.
    async fn cas_miss(&self, item_id: &ItemId, expected_version: u32) -> DomainError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM consensus_scores WHERE item_id = $1)",
        )
        .bind(item_id.as_uuid())
        .fetch_one(&self.pool)
        .await;

        match exists {
            Ok(true) => DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Consensus for item {} changed since version {}",
                    item_id, expected_version
                ),
            ),
            Ok(false) => DomainError::new(
                ErrorCode::ConsensusNotFound,
                format!("No consensus locked for item {}", item_id),
            ),
            Err(e) => db_error("Failed to check consensus score", e),
        }
    }
}

/// Raw values: a stored zero complexity is surfaced to the ranking
/// calculator instead of being rejected here.
#[derive(Debug, sqlx::FromRow)]
struct ConsensusRow {
    item_id: Uuid,
    project_id: Uuid,
    s_value: i32,
    s_complexity: i32,
    locked_by: Uuid,
    locked_at: DateTime<Utc>,
    rationale: Option<String>,
    version: i32,
}

impl From<ConsensusRow> for ConsensusScore {
    fn from(row: ConsensusRow) -> Self {
        ConsensusScore::reconstitute(
            ProjectId::from_uuid(row.project_id),
            ItemId::from_uuid(row.item_id),
            row.s_value.max(0) as u32,
            row.s_complexity.max(0) as u32,
            AttendeeId::from_uuid(row.locked_by),
            Timestamp::from_datetime(row.locked_at),
            row.rationale,
            row.version as u32,
        )
    }
}

#[async_trait]
impl ConsensusScoreRepository for PostgresConsensusRepository {
    async fn find(&self, item_id: &ItemId) -> Result<Option<ConsensusScore>, DomainError> {
        let row = sqlx::query_as::<_, ConsensusRow>(
            r#"
            SELECT item_id, project_id, s_value, s_complexity, locked_by, locked_at,
                   rationale, version
            FROM consensus_scores
            WHERE item_id = $1
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load consensus score", e))?;

        Ok(row.map(ConsensusScore::from))
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ConsensusScore>, DomainError> {
        let rows = sqlx::query_as::<_, ConsensusRow>(
            r#"
            SELECT item_id, project_id, s_value, s_complexity, locked_by, locked_at,
                   rationale, version
            FROM consensus_scores
            WHERE project_id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load consensus scores", e))?;

        Ok(rows.into_iter().map(ConsensusScore::from).collect())
    }

    async fn insert(&self, consensus: &ConsensusScore) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO consensus_scores (
                item_id, project_id, s_value, s_complexity, locked_by, locked_at,
                rationale, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(consensus.item_id().as_uuid())
        .bind(consensus.project_id().as_uuid())
        .bind(consensus.s_value() as i32)
        .bind(consensus.s_complexity() as i32)
        .bind(consensus.locked_by().as_uuid())
        .bind(consensus.locked_at().as_datetime())
        .bind(consensus.rationale())
        .bind(consensus.version() as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!("Consensus for item {} was locked concurrently", consensus.item_id()),
                )
            } else {
                db_error("Failed to insert consensus score", e)
            }
        })?;

        Ok(())
    }

    async fn update(
        &self,
        consensus: &ConsensusScore,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE consensus_scores SET
                s_value = $2,
                s_complexity = $3,
                locked_by = $4,
                locked_at = $5,
                rationale = $6,
                version = $7
            WHERE item_id = $1 AND version = $8
            "#,
        )
        .bind(consensus.item_id().as_uuid())
        .bind(consensus.s_value() as i32)
        .bind(consensus.s_complexity() as i32)
        .bind(consensus.locked_by().as_uuid())
        .bind(consensus.locked_at().as_datetime())
        .bind(consensus.rationale())
        .bind(consensus.version() as i32)
        .bind(expected_version as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update consensus score", e))?;

        if result.rows_affected() == 0 {
            return Err(self.cas_miss(consensus.item_id(), expected_version).await);
        }
        Ok(())
    }

    async fn delete(&self, item_id: &ItemId, expected_version: u32) -> Result<(), DomainError> {
        let result =
            sqlx::query("DELETE FROM consensus_scores WHERE item_id = $1 AND version = $2")
                .bind(item_id.as_uuid())
                .bind(expected_version as i32)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to delete consensus score", e))?;

        if result.rows_affected() == 0 {
            return Err(self.cas_miss(item_id, expected_version).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_row(value: i32) -> EntryRow {
        EntryRow {
            project_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            attendee_id: Uuid::new_v4(),
            criterion: "value".to_string(),
            value,
            rationale: Some("customers keep asking".to_string()),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn entry_row_maps_to_domain() {
        let entry = entry_row(13).into_entry().unwrap();
        assert_eq!(entry.value.value(), 13);
        assert_eq!(entry.criterion, Criterion::Value);
    }

    #[test]
    fn non_fibonacci_entry_is_corrupt() {
        let err = entry_row(4).into_entry().unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn consensus_row_keeps_zero_complexity() {
        let row = ConsensusRow {
            item_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            s_value: 8,
            s_complexity: 0,
            locked_by: Uuid::new_v4(),
            locked_at: Utc::now(),
            rationale: None,
            version: 2,
        };

        let consensus = ConsensusScore::from(row);
        assert_eq!(consensus.s_complexity(), 0);
        assert_eq!(consensus.version(), 2);
    }
}

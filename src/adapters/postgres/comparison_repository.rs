//! PostgreSQL implementation of ComparisonSetRepository and WinTallyReader.
//!
//! Votes live as a JSONB array on the comparison row so a vote, the
//! recomputed outcome and the version bump commit in one statement.
//!
//! A comparison write holds a `FOR SHARE` lock on its set row and completion
//! takes `FOR UPDATE`, so a set never completes while a vote on it is in
//! flight and never accepts one afterwards.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    AttendeeId, ComparisonId, ComparisonSetId, Criterion, DomainError, ErrorCode, ItemId,
    ProjectId, Timestamp, ValidationError,
};
use crate::domain::pairwise::{
    Comparison, ComparisonSet, ComparisonSetStatus, ConsensusRule, Outcome, Vote, WinTally,
};
use crate::ports::{ComparisonSetRepository, WinTallyReader};

use super::pool::{corrupt_row, db_error, is_unique_violation};

const SET_COLUMNS: &str = "id, project_id, criterion, status, item_ids, expected_voters, \
                           quorum_percent, created_at, completed_at";

const COMPARISON_COLUMNS: &str =
    "id, set_id, position, item_a, item_b, votes, outcome, resolved_at, version";

#[derive(Clone)]
pub struct PostgresComparisonRepository {
    pool: PgPool,
}

impl PostgresComparisonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_sets(
        &self,
        filter: &str,
        project_id: &ProjectId,
        criterion: Option<Criterion>,
    ) -> Result<Vec<ComparisonSet>, DomainError> {
        let sql = format!("SELECT {} FROM comparison_sets WHERE {}", SET_COLUMNS, filter);
        let mut query = sqlx::query_as::<_, SetRow>(&sql).bind(project_id.as_uuid());
        if let Some(criterion) = criterion {
            query = query.bind(criterion.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load comparison sets", e))?;

        rows.into_iter().map(SetRow::into_set).collect()
    }
}

fn parse_status(raw: &str) -> Result<ComparisonSetStatus, DomainError> {
    raw.parse().map_err(|e| corrupt_row("comparison_sets", e))
}

/// Internal row type for sqlx query mapping.
#[derive(Debug, sqlx::FromRow)]
struct SetRow {
    id: Uuid,
    project_id: Uuid,
    criterion: String,
    status: String,
    item_ids: Vec<Uuid>,
    expected_voters: Vec<Uuid>,
    quorum_percent: i16,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SetRow {
    fn into_set(self) -> Result<ComparisonSet, DomainError> {
        let criterion: Criterion = self
            .criterion
            .parse()
            .map_err(|e| corrupt_row("comparison_sets", e))?;
        let status = parse_status(&self.status)?;
        let percent = u8::try_from(self.quorum_percent).map_err(|_| {
            corrupt_row(
                "comparison_sets",
                ValidationError::out_of_range("quorum_percent", 1, 100, i64::from(self.quorum_percent)),
            )
        })?;
        let rule = ConsensusRule::new(percent).map_err(|e| corrupt_row("comparison_sets", e))?;

        Ok(ComparisonSet::reconstitute(
            ComparisonSetId::from_uuid(self.id),
            ProjectId::from_uuid(self.project_id),
            criterion,
            status,
            self.item_ids.into_iter().map(ItemId::from_uuid).collect(),
            self.expected_voters
                .into_iter()
                .map(AttendeeId::from_uuid)
                .collect(),
            rule,
            Timestamp::from_datetime(self.created_at),
            self.completed_at.map(Timestamp::from_datetime),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ComparisonRow {
    id: Uuid,
    set_id: Uuid,
    position: i32,
    item_a: Uuid,
    item_b: Uuid,
    votes: Json<Vec<Vote>>,
    outcome: String,
    resolved_at: Option<DateTime<Utc>>,
    version: i32,
}

impl ComparisonRow {
    fn into_comparison(self) -> Result<Comparison, DomainError> {
        let outcome = Outcome::parse(&self.outcome).map_err(|e| corrupt_row("comparisons", e))?;

        Ok(Comparison::reconstitute(
            ComparisonId::from_uuid(self.id),
            ComparisonSetId::from_uuid(self.set_id),
            self.position as u32,
            ItemId::from_uuid(self.item_a),
            ItemId::from_uuid(self.item_b),
            self.votes.0,
            outcome,
            self.resolved_at.map(Timestamp::from_datetime),
            self.version as u32,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TallyRow {
    item_id: Uuid,
    wins: i64,
    ties: i64,
}

#[async_trait]
impl ComparisonSetRepository for PostgresComparisonRepository {
    async fn create(
        &self,
        set: &ComparisonSet,
        comparisons: &[Comparison],
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let item_ids: Vec<Uuid> = set.item_ids().iter().map(|i| *i.as_uuid()).collect();
        let voters: Vec<Uuid> = set.expected_voters().iter().map(|a| *a.as_uuid()).collect();

        sqlx::query(
            r#"
            INSERT INTO comparison_sets (
                id, project_id, criterion, status, item_ids, expected_voters,
                quorum_percent, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(set.id().as_uuid())
        .bind(set.project_id().as_uuid())
        .bind(set.criterion().as_str())
        .bind(set.status().as_str())
        .bind(&item_ids)
        .bind(&voters)
        .bind(i16::from(set.rule().quorum_percent()))
        .bind(set.created_at().as_datetime())
        .bind(set.completed_at().map(|t| *t.as_datetime()))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::ActiveSessionExists,
                    format!("An active {} session already exists", set.criterion()),
                )
            } else {
                db_error("Failed to insert comparison set", e)
            }
        })?;

        for comparison in comparisons {
            sqlx::query(
                r#"
                INSERT INTO comparisons (
                    id, set_id, position, item_a, item_b, votes, outcome, resolved_at, version
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(comparison.id().as_uuid())
            .bind(comparison.set_id().as_uuid())
            .bind(comparison.position() as i32)
            .bind(*comparison.item_a().as_uuid())
            .bind(*comparison.item_b().as_uuid())
            .bind(Json(comparison.votes()))
            .bind(comparison.outcome().as_str())
            .bind(comparison.resolved_at().map(|t| *t.as_datetime()))
            .bind(comparison.version() as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert comparison", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit comparison set", e))?;

        tracing::debug!(
            set_id = %set.id(),
            comparisons = comparisons.len(),
            "comparison set persisted"
        );
        Ok(())
    }

    async fn find_set(&self, id: &ComparisonSetId) -> Result<Option<ComparisonSet>, DomainError> {
        let sql = format!("SELECT {} FROM comparison_sets WHERE id = $1", SET_COLUMNS);
        let row = sqlx::query_as::<_, SetRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load comparison set", e))?;

        row.map(SetRow::into_set).transpose()
    }

    async fn find_active(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError> {
        let sets = self
            .fetch_sets(
                "project_id = $1 AND criterion = $2 AND status = 'active'",
                project_id,
                Some(criterion),
            )
            .await?;
        Ok(sets.into_iter().next())
    }

    async fn find_latest(
        &self,
        project_id: &ProjectId,
        criterion: Criterion,
    ) -> Result<Option<ComparisonSet>, DomainError> {
        let sets = self
            .fetch_sets(
                "project_id = $1 AND criterion = $2 ORDER BY created_at DESC LIMIT 1",
                project_id,
                Some(criterion),
            )
            .await?;
        Ok(sets.into_iter().next())
    }

    async fn list_active(&self, project_id: &ProjectId) -> Result<Vec<ComparisonSet>, DomainError> {
        self.fetch_sets(
            "project_id = $1 AND status = 'active' ORDER BY created_at",
            project_id,
            None,
        )
        .await
    }

    async fn find_comparison(&self, id: &ComparisonId) -> Result<Option<Comparison>, DomainError> {
        let sql = format!("SELECT {} FROM comparisons WHERE id = $1", COMPARISON_COLUMNS);
        let row = sqlx::query_as::<_, ComparisonRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load comparison", e))?;

        row.map(ComparisonRow::into_comparison).transpose()
    }

    async fn list_comparisons(
        &self,
        set_id: &ComparisonSetId,
    ) -> Result<Vec<Comparison>, DomainError> {
        let sql = format!(
            "SELECT {} FROM comparisons WHERE set_id = $1 ORDER BY position",
            COMPARISON_COLUMNS
        );
        let rows = sqlx::query_as::<_, ComparisonRow>(&sql)
            .bind(set_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load comparisons", e))?;

        rows.into_iter().map(ComparisonRow::into_comparison).collect()
    }

    async fn update_comparison(
        &self,
        comparison: &Comparison,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let status = sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.status FROM comparison_sets s
            JOIN comparisons c ON c.set_id = s.id
            WHERE c.id = $1
            FOR SHARE OF s
            "#,
        )
        .bind(comparison.id().as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock comparison set", e))?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::ComparisonNotFound,
                format!("Comparison not found: {}", comparison.id()),
            )
        })?;

        if !parse_status(&status)?.accepts_votes() {
            return Err(DomainError::new(
                ErrorCode::SessionNotActive,
                format!("Comparison set of {} no longer accepts votes", comparison.id()),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE comparisons SET
                votes = $2,
                outcome = $3,
                resolved_at = $4,
                version = $5
            WHERE id = $1 AND version = $6
            "#,
        )
        .bind(comparison.id().as_uuid())
        .bind(Json(comparison.votes()))
        .bind(comparison.outcome().as_str())
        .bind(comparison.resolved_at().map(|t| *t.as_datetime()))
        .bind(comparison.version() as i32)
        .bind(expected_version as i32)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update comparison", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Comparison {} changed since version {}",
                    comparison.id(),
                    expected_version
                ),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit comparison", e))?;

        Ok(())
    }

    async fn complete_if_resolved(
        &self,
        set_id: &ComparisonSetId,
        completed_at: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Waits for in-flight comparison writes; the count below then sees them
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM comparison_sets WHERE id = $1 FOR UPDATE",
        )
        .bind(set_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock comparison set", e))?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::ComparisonSetNotFound,
                format!("Comparison set not found: {}", set_id),
            )
        })?;

        if !parse_status(&status)?.accepts_votes() {
            return Ok(false);
        }

        let open = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comparisons WHERE set_id = $1 AND outcome = 'unresolved'",
        )
        .bind(set_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to count unresolved comparisons", e))?;
        if open > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE comparison_sets SET
                status = 'completed',
                completed_at = $2
            WHERE id = $1
            "#,
        )
        .bind(set_id.as_uuid())
        .bind(completed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to complete comparison set", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit set completion", e))?;

        Ok(true)
    }
}

#[async_trait]
impl WinTallyReader for PostgresComparisonRepository {
    async fn tallies(
        &self,
        set_id: &ComparisonSetId,
    ) -> Result<HashMap<ItemId, WinTally>, DomainError> {
        let rows = sqlx::query_as::<_, TallyRow>(
            r#"
            SELECT item_id, SUM(wins)::BIGINT AS wins, SUM(ties)::BIGINT AS ties
            FROM (
                SELECT item_a AS item_id,
                       (outcome = 'a_wins')::INT AS wins,
                       (outcome = 'tie')::INT AS ties
                FROM comparisons
                WHERE set_id = $1 AND outcome <> 'unresolved'
                UNION ALL
                SELECT item_b AS item_id,
                       (outcome = 'b_wins')::INT AS wins,
                       (outcome = 'tie')::INT AS ties
                FROM comparisons
                WHERE set_id = $1 AND outcome <> 'unresolved'
            ) credited
            GROUP BY item_id
            "#,
        )
        .bind(set_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to tally comparison outcomes", e))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    ItemId::from_uuid(row.item_id),
                    WinTally {
                        wins: row.wins as u32,
                        ties: row.ties as u32,
                    },
                )
            })
            .collect())
    }
}

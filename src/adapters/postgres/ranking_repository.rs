//! PostgreSQL implementation of RankingRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{AttendeeId, DomainError, ItemId, ProjectId, Timestamp};
use crate::domain::ranking::{RankingResult, RankingSet};
use crate::ports::RankingRepository;

use super::pool::db_error;

#[derive(Clone)]
pub struct PostgresRankingRepository {
    pool: PgPool,
}

impl PostgresRankingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    item_id: Uuid,
    item_name: String,
    win_weight_value: f64,
    win_weight_complexity: f64,
    s_value: i32,
    s_complexity: i32,
    weighted_value: f64,
    weighted_complexity: f64,
    final_score: f64,
    rank: i32,
    calculated_by: Uuid,
    calculated_at: DateTime<Utc>,
}

impl From<ResultRow> for RankingResult {
    fn from(row: ResultRow) -> Self {
        RankingResult {
            item_id: ItemId::from_uuid(row.item_id),
            item_name: row.item_name,
            win_weight_value: row.win_weight_value,
            win_weight_complexity: row.win_weight_complexity,
            s_value: row.s_value.max(0) as u32,
            s_complexity: row.s_complexity.max(0) as u32,
            weighted_value: row.weighted_value,
            weighted_complexity: row.weighted_complexity,
            final_score: row.final_score,
            rank: row.rank.max(0) as u32,
        }
    }
}

#[async_trait]
impl RankingRepository for PostgresRankingRepository {
    /// Deletes the project's previous ranking and inserts the new one in a
    /// single transaction.
    async fn replace(&self, ranking: &RankingSet) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM ranking_results WHERE project_id = $1")
            .bind(ranking.project_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to clear previous ranking", e))?;

        for result in &ranking.results {
            sqlx::query(
                r#"
                INSERT INTO ranking_results (
                    project_id, item_id, item_name, win_weight_value, win_weight_complexity,
                    s_value, s_complexity, weighted_value, weighted_complexity, final_score,
                    rank, calculated_by, calculated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(ranking.project_id.as_uuid())
            .bind(result.item_id.as_uuid())
            .bind(&result.item_name)
            .bind(result.win_weight_value)
            .bind(result.win_weight_complexity)
            .bind(result.s_value as i32)
            .bind(result.s_complexity as i32)
            .bind(result.weighted_value)
            .bind(result.weighted_complexity)
            .bind(result.final_score)
            .bind(result.rank as i32)
            .bind(ranking.calculated_by.as_uuid())
            .bind(ranking.calculated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert ranking result", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit ranking", e))?;

        Ok(())
    }

    async fn find(&self, project_id: &ProjectId) -> Result<Option<RankingSet>, DomainError> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT item_id, item_name, win_weight_value, win_weight_complexity,
                   s_value, s_complexity, weighted_value, weighted_complexity,
                   final_score, rank, calculated_by, calculated_at
            FROM ranking_results
            WHERE project_id = $1
            ORDER BY rank
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load ranking", e))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let calculated_by = AttendeeId::from_uuid(first.calculated_by);
        let calculated_at = Timestamp::from_datetime(first.calculated_at);

        Ok(Some(RankingSet {
            project_id: *project_id,
            results: rows.into_iter().map(RankingResult::from).collect(),
            calculated_by,
            calculated_at,
        }))
    }
}

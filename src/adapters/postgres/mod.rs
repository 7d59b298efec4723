//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresComparisonRepository` - Comparison sets, comparisons and win tallies
//! - `PostgresScoreRepository` - Individual score entries
//! - `PostgresConsensusRepository` - Facilitator-locked consensus scores
//! - `PostgresRankingRepository` - Latest ranking per project
//!
//! Schema lives in `migrations/`.

mod comparison_repository;
mod pool;
mod ranking_repository;
mod score_repository;

pub use comparison_repository::PostgresComparisonRepository;
pub use pool::connect;
pub use ranking_repository::PostgresRankingRepository;
pub use score_repository::{PostgresConsensusRepository, PostgresScoreRepository};

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::WorkshopPorts;
use crate::ports::WorkshopRegistry;

/// Postgres-backed persistence ports sharing one pool.
pub fn postgres_ports(pool: PgPool, registry: Arc<dyn WorkshopRegistry>) -> WorkshopPorts {
    let comparisons = Arc::new(PostgresComparisonRepository::new(pool.clone()));
    WorkshopPorts {
        sets: comparisons.clone(),
        tallies: comparisons,
        entries: Arc::new(PostgresScoreRepository::new(pool.clone())),
        consensus: Arc::new(PostgresConsensusRepository::new(pool.clone())),
        rankings: Arc::new(PostgresRankingRepository::new(pool)),
        registry,
    }
}

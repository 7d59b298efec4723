//! Pool construction and sqlx error mapping shared by the repositories.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Opens a connection pool and applies migrations when configured to.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| db_error("Failed to connect to database", e))?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("database migrations applied");
    }

    Ok(pool)
}

/// Maps a sqlx failure to a transient domain error.
///
/// Pool exhaustion becomes `Timeout`, everything else `DatabaseError`.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    let code = match &err {
        sqlx::Error::PoolTimedOut => ErrorCode::Timeout,
        _ => ErrorCode::DatabaseError,
    };
    DomainError::new(code, format!("{}: {}", context, err))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// A stored row that no longer satisfies domain validation.
pub(crate) fn corrupt_row(table: &str, err: ValidationError) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("Corrupt row in {}: {}", table, err),
    )
}

//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Quorum percent must be between 1 and 100, got {0}")]
    InvalidQuorum(u8),

    #[error("Vote retry limit must be between 1 and 50, got {0}")]
    InvalidRetryLimit(u32),

    #[error("Event queue capacity must be between 1 and 1000000, got {0}")]
    InvalidQueueCapacity(usize),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}

//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `PRIORITY_WORKSHOP` prefix; nested values use `__` as separator.
//! A `.env` file is honored in development.
//!
//! # Example
//!
//! ```no_run
//! use priority_workshop::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod engine;
mod error;
mod events;
mod logging;

pub use database::DatabaseConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use events::EventsConfig;
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root configuration
///
/// Every section has defaults except the database, which is optional:
/// without it the in-memory adapters are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `PRIORITY_WORKSHOP__ENGINE__QUORUM_PERCENT=70` -> `engine.quorum_percent = 70`
    /// - `PRIORITY_WORKSHOP__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRIORITY_WORKSHOP")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.events.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }
}

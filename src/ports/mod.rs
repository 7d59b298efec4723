//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ComparisonSetRepository` - Sets and versioned comparisons
//! - `WinTallyReader` - Resolved win/tie counts per item
//! - `ScoreEntryRepository` / `ConsensusScoreRepository` - Absolute scores
//! - `RankingRepository` - Atomically replaced ranking sets
//!
//! ## Collaborator Ports
//!
//! - `WorkshopRegistry` - Items and attendees per project
//! - `EventPublisher` / `EventSubscriber` / `EventHandler` - Domain events
//! - `PublishFailureObserver` - Sink for events that failed to publish

mod comparison_set_repository;
mod event_publisher;
mod event_subscriber;
mod ranking_repository;
mod score_repository;
mod win_tally_reader;
mod workshop_registry;

pub use comparison_set_repository::ComparisonSetRepository;
pub use event_publisher::{EventPublisher, LoggingFailureObserver, PublishFailureObserver};
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use ranking_repository::RankingRepository;
pub use score_repository::{ConsensusScoreRepository, ScoreEntryRepository};
pub use win_tally_reader::WinTallyReader;
pub use workshop_registry::WorkshopRegistry;

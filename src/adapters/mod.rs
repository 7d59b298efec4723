//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event bus implementations (in-memory, channel-backed)
//! - `memory` - In-memory persistence and registry
//! - `postgres` - PostgreSQL persistence via sqlx

pub mod events;
pub mod memory;
pub mod postgres;

pub use events::{event_channel, ChannelEventPublisher, EventDispatcher, InMemoryEventBus};
pub use memory::in_memory_ports;
pub use postgres::postgres_ports;

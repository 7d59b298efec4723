//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus with inspection helpers
//! - `ChannelEventPublisher` - Non-blocking enqueue onto a bounded channel
//! - `EventDispatcher` - Background task draining the channel downstream
//! - `ConsensusAuditLog` - Subscriber keeping the consensus change trail

mod channel;
mod consensus_audit;
mod dispatcher;
mod in_memory;

pub use channel::{event_channel, ChannelEventPublisher};
pub use consensus_audit::{AuditAction, AuditEntry, ConsensusAuditLog};
pub use dispatcher::{DispatchStats, EventDispatcher};
pub use in_memory::InMemoryEventBus;

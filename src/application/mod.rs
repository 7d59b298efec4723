//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) are kept apart, and
//! every command handler reports its outcome through the `EventEmitter`.

mod emitter;
pub mod handlers;
mod workshop;

pub use emitter::EventEmitter;
pub use workshop::{WorkshopHandlers, WorkshopPorts};

//! In-memory persistence adapters.
//!
//! Back every persistence port with `tokio::sync::RwLock`-guarded maps.
//! Used by tests and by embedders that do not need durability.

mod comparison_store;
mod ranking_store;
mod registry;
mod score_store;

pub use comparison_store::InMemoryComparisonStore;
pub use ranking_store::InMemoryRankingStore;
pub use registry::InMemoryRegistry;
pub use score_store::{InMemoryConsensusStore, InMemoryScoreStore};

use std::sync::Arc;

use crate::application::WorkshopPorts;
use crate::ports::WorkshopRegistry;

/// Fresh in-memory stores for every persistence port.
pub fn in_memory_ports(registry: Arc<dyn WorkshopRegistry>) -> WorkshopPorts {
    let comparisons = Arc::new(InMemoryComparisonStore::new());
    WorkshopPorts {
        sets: comparisons.clone(),
        tallies: comparisons,
        entries: Arc::new(InMemoryScoreStore::new()),
        consensus: Arc::new(InMemoryConsensusStore::new()),
        rankings: Arc::new(InMemoryRankingStore::new()),
        registry,
    }
}

//! Win tally reader port (read side).
//!
//! Answers "resolved wins and ties per item" for one comparison set
//! without loading every vote.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{ComparisonSetId, DomainError, ItemId};
use crate::domain::pairwise::WinTally;

#[async_trait]
pub trait WinTallyReader: Send + Sync {
    /// Wins and ties per item over the set's resolved comparisons.
    ///
    /// Items without a resolved comparison are absent from the map.
    async fn tallies(&self, set_id: &ComparisonSetId)
        -> Result<HashMap<ItemId, WinTally>, DomainError>;
}

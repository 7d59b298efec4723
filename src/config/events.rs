//! Event delivery configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_QUEUE_CAPACITY: usize = 1_000_000;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventsConfig {
    /// Events buffered between the write path and the dispatcher.
    /// Publishing into a full queue fails instead of waiting.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ValidationError::InvalidQueueCapacity(self.queue_capacity));
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

//! Background task queue configuration types

use crate::constants::TASK_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Background task queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Pending tasks held before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            queue_capacity: TASK_QUEUE_CAPACITY,
        }
    }
}

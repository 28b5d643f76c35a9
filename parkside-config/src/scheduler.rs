//! Execution scheduler configuration.
//!
//! Tunables for the throughput/latency trade-off: how many simulated turns
//! one engine invocation covers, how long a scheduling slot may hold the
//! execution thread, and how far the target runs ahead before auto-pausing.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Execution scheduler parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, Copy)]
pub struct SchedulerConfig {
    /// Turns requested per engine invocation. Larger chunks amortize call
    /// overhead but widen the gap between stop checks.
    #[serde(default = "default_chunk_size")]
    #[validate(range(min = 1, max = 10_000_000))]
    pub chunk_size: u32,

    /// Wall-clock budget per scheduling slot, in milliseconds.
    #[serde(default = "default_slot_budget_ms")]
    #[validate(range(min = 1, max = 10_000))]
    pub slot_budget_ms: u64,

    /// Ticks between auto-pauses; each start/resume raises the target by
    /// this much.
    #[serde(default = "default_pause_interval")]
    #[validate(range(min = 1))]
    pub pause_interval: u64,
}

fn default_chunk_size() -> u32 {
    10_000
}

fn default_slot_budget_ms() -> u64 {
    100
}

fn default_pause_interval() -> u64 {
    100_000_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            slot_budget_ms: default_slot_budget_ms(),
            pause_interval: default_pause_interval(),
        }
    }
}

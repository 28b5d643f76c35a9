//! Messages exchanged between the coordinator and the execution thread.
//!
//! The two sides share no state. The coordinator sends [`WorkerCommand`]s
//! over a bounded-latency channel; the execution thread reports back with
//! [`WorkerEvent`]s. Every message that depends on which engine handle is
//! live carries the [`Generation`] it was produced under, so results from a
//! superseded handle can be recognized and dropped instead of being merged
//! into fresh counters.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use parkside_engine::RuleVariant;
use parkside_stats::{BoardSpace, StatsSnapshot};

use crate::error::DriverError;

/// Engine-handle epoch. Bumped on every reinitialization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Coordinator -> execution thread.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Replace the engine handle with a fresh one for `variant`. Discards
    /// all progress; counters restart from zero.
    Initialize {
        variant: RuleVariant,
        generation: Generation,
    },

    /// Compute the closed-form expected frequencies for `variant` on the
    /// live handle.
    ComputeBaseline {
        variant: RuleVariant,
        generation: Generation,
    },

    /// Raise the tick target by `raise_by` above current progress and run.
    Start { raise_by: u64 },

    /// Stop scheduling after the in-flight chunk. Progress is kept.
    Stop,

    /// Terminate the execution thread.
    Shutdown,
}

/// Execution thread -> coordinator.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A fresh handle is live; board metadata fetched once per handle.
    Ready {
        generation: Generation,
        spaces: Vec<BoardSpace>,
        reason_descriptions: Vec<String>,
    },

    /// Expected frequencies for the live handle's variant.
    Baseline {
        generation: Generation,
        frequencies: Vec<f64>,
    },

    /// One chunk completed and decoded. `reached_target` is set on the chunk
    /// that hits the auto-pause target; the scheduler has already halted.
    Chunk {
        generation: Generation,
        snapshot: Arc<StatsSnapshot>,
        reached_target: bool,
    },

    /// Unrecoverable failure on the execution side.
    Fatal(DriverError),
}

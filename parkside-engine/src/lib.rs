//! # Parkside Engine Boundary
//!
//! The simulation engine is an external collaborator: an opaque stepper that
//! advances N logical turns and returns cumulative counters. This crate owns
//! the boundary only: the `SimulationEngine` trait the driver consumes, the
//! rule variant identifier, and two in-process implementations:
//!
//! - [`synthetic::SyntheticEngine`]: a seeded, weighted-random counter
//!   generator for headless demos and end-to-end tests. It honours every
//!   counter invariant without implementing any board-game rules.
//! - [`scripted::ScriptedEngine`]: a fully deterministic stepper for driver
//!   and scheduler tests (exact tick accounting, optional short runs).
//!
//! ## Counter contract
//!
//! Engines must keep all counters monotonically non-decreasing for the life
//! of one handle. Landing on the go-to-jail space records an arrival and a
//! move there, with the forcing reason in that space's reason row, followed
//! by a second arrival and move at the jail space. Just-visiting turns count
//! only at the jail space. The decoder and leaderboard rely on this split.

#![deny(rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use parkside_stats::{BoardSpace, RawStatsChunk};

pub mod scripted;
pub mod synthetic;

/// Jail-entry policy toggle. Reinitializing with a different variant replaces
/// the engine handle and resets every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleVariant {
    /// Pay immediately and roll out next turn.
    #[default]
    PayToExit,
    /// Wait in jail rolling for a double.
    JailWait,
}

impl RuleVariant {
    pub fn toggled(self) -> Self {
        match self {
            RuleVariant::PayToExit => RuleVariant::JailWait,
            RuleVariant::JailWait => RuleVariant::PayToExit,
        }
    }
}

impl std::fmt::Display for RuleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleVariant::PayToExit => f.write_str("pay-to-exit"),
            RuleVariant::JailWait => f.write_str("jail-wait"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Allocation failure creating a fresh handle. Fatal; never retried.
    #[error("engine allocation failed: {0}")]
    Exhausted(String),
}

/// One live simulation handle.
///
/// `run` is the only potentially long call and may block its thread for the
/// duration of the requested ticks; callers bound the request size. It may
/// consume fewer ticks than requested; the returned cumulative `turns` is
/// authoritative, never the request.
pub trait SimulationEngine: Send {
    /// Advance by at most `ticks` turns and return cumulative counters.
    fn run(&mut self, ticks: u32) -> RawStatsChunk;

    /// Static board metadata, fetched once per handle.
    fn spaces(&self) -> &[BoardSpace];

    /// Arrival-reason column descriptions; the reason stride is their count.
    fn reason_descriptions(&self) -> &[String];

    /// Closed-form expected arrival fraction per space for a variant.
    /// Independent of simulated history.
    fn expected_frequencies(&self, variant: RuleVariant) -> Vec<f64>;
}

/// Creates engine handles. Reinitialization goes through the factory so the
/// old handle is discarded only once the new one is ready.
pub trait EngineFactory: Send + Sync {
    fn create(&self, variant: RuleVariant) -> Result<Box<dyn SimulationEngine>, EngineError>;
}

//! Deterministic scripted engine for scheduler and driver tests.
//!
//! Every call consumes a predictable number of ticks and lays arrivals down
//! in track order, so tests can assert exact call counts, tick totals and
//! per-space counters without any randomness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parkside_stats::{BoardSpace, RawStatsChunk};

use crate::{EngineError, EngineFactory, RuleVariant, SimulationEngine};

pub struct ScriptedEngine {
    spaces: Vec<BoardSpace>,
    reason_descs: Vec<String>,
    /// Per-call consumption cap; simulates an engine returning early.
    consume_limit: Option<u32>,
    counters: RawStatsChunk,
    run_calls: u64,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let spaces = parkside_stats::standard_spaces();
        let reason_descs = vec!["Scripted".to_string()];
        let counters = RawStatsChunk::zeroed(spaces.len(), reason_descs.len());

        Self {
            spaces,
            reason_descs,
            consume_limit: None,
            counters,
            run_calls: 0,
        }
    }

    /// Cap how many ticks one `run` call may consume.
    pub fn with_consume_limit(mut self, limit: u32) -> Self {
        self.consume_limit = Some(limit);
        self
    }

    pub fn run_calls(&self) -> u64 {
        self.run_calls
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine for ScriptedEngine {
    fn run(&mut self, ticks: u32) -> RawStatsChunk {
        self.run_calls += 1;

        let consumed = match self.consume_limit {
            Some(limit) => ticks.min(limit),
            None => ticks,
        } as u64;

        // Spread arrivals in track order without iterating per tick, so
        // billion-tick schedules stay cheap to test.
        let spaces = self.spaces.len() as u64;
        let start = self.counters.turns;

        for (i, arrivals) in self.counters.arrivals.iter_mut().enumerate() {
            let offset = (spaces + i as u64 - start % spaces) % spaces;
            if offset < consumed {
                *arrivals += (consumed - offset).div_ceil(spaces);
            }
        }

        for (i, count) in self.counters.roll_freq.iter_mut().enumerate() {
            let offset = (11 + i as u64 - start % 11) % 11;
            if offset < consumed {
                *count += (consumed - offset).div_ceil(11);
            }
        }

        self.counters.turns += consumed;
        self.counters.moves += consumed;

        self.counters.clone()
    }

    fn spaces(&self) -> &[BoardSpace] {
        &self.spaces
    }

    fn reason_descriptions(&self) -> &[String] {
        &self.reason_descs
    }

    fn expected_frequencies(&self, _variant: RuleVariant) -> Vec<f64> {
        vec![1.0 / self.spaces.len() as f64; self.spaces.len()]
    }
}

/// Factory for scripted engines; counts handle creations so tests can assert
/// reinitialization behaviour.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    consume_limit: Option<u32>,
    created: Arc<AtomicU64>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consume_limit(mut self, limit: u32) -> Self {
        self.consume_limit = Some(limit);
        self
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, _variant: RuleVariant) -> Result<Box<dyn SimulationEngine>, EngineError> {
        self.created.fetch_add(1, Ordering::SeqCst);

        let mut engine = ScriptedEngine::new();
        engine.consume_limit = self.consume_limit;

        Ok(Box::new(engine))
    }
}

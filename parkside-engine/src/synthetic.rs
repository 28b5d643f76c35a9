//! Seeded synthetic engine.
//!
//! Produces statistically plausible counters for demos and end-to-end tests
//! by sampling arrivals from a fixed weight table; no dice mechanics, card
//! decks, or jail transition rules are modelled. The weight table doubles as
//! the closed-form baseline, so observed frequencies converge on the
//! reported expectation over long runs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use parkside_stats::{BoardSpace, RawStatsChunk, SpaceKind};

use crate::{EngineError, EngineFactory, RuleVariant, SimulationEngine};

/// Reason column order reported by this engine.
pub const REASON_DESCS: [&str; 4] = [
    "Chance Card",
    "Community Chest Card",
    "Sent to Jail",
    "Triple Double",
];

const REASON_CHANCE: usize = 0;
const REASON_COMM_CHEST: usize = 1;
const REASON_SENT_TO_JAIL: usize = 2;
const REASON_TRIPLE_DOUBLE: usize = 3;

/// Fraction of card-space arrivals attributed to a card redirect.
const CARD_REDIRECT_RATE: f64 = 0.25;

pub struct SyntheticEngine {
    variant: RuleVariant,
    spaces: Vec<BoardSpace>,
    reason_descs: Vec<String>,
    weights: Vec<f64>,
    weight_total: f64,
    jail: usize,
    go_to_jail: usize,
    counters: RawStatsChunk,
    rng: SmallRng,
}

impl SyntheticEngine {
    pub fn new(variant: RuleVariant, seed: u64) -> Self {
        let spaces = parkside_stats::standard_spaces();
        let weights = arrival_weights(&spaces, variant);
        let weight_total = weights.iter().sum();

        let jail = spaces
            .iter()
            .position(|s| s.kind == SpaceKind::Jail)
            .expect("standard board has a jail space");
        let go_to_jail = spaces
            .iter()
            .position(|s| s.kind == SpaceKind::GoToJail)
            .expect("standard board has a go-to-jail space");

        let counters = RawStatsChunk::zeroed(spaces.len(), REASON_DESCS.len());

        debug!(%variant, seed, spaces = spaces.len(), "synthetic engine created");

        Self {
            variant,
            spaces,
            reason_descs: REASON_DESCS.iter().map(|s| s.to_string()).collect(),
            weights,
            weight_total,
            jail,
            go_to_jail,
            counters,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn roll(&mut self) -> (u8, u8) {
        let d1 = self.rng.random_range(1..=6u8);
        let d2 = self.rng.random_range(1..=6u8);
        self.counters.roll_freq[(d1 + d2) as usize - 2] += 1;
        (d1, d2)
    }

    fn sample_space(&mut self) -> usize {
        let mut pick = self.rng.random_range(0.0..self.weight_total);

        for (i, w) in self.weights.iter().enumerate() {
            if pick < *w {
                return i;
            }
            pick -= w;
        }

        self.weights.len() - 1
    }

    fn arrive(&mut self, space: usize, reason: Option<usize>) {
        self.counters.arrivals[space] += 1;
        self.counters.moves += 1;

        if let Some(reason) = reason {
            let stride = self.reason_descs.len();
            self.counters.reasons_flat[space * stride + reason] += 1;
        }
    }

    fn forced_to_jail(&mut self, reason: usize) {
        // Land on go-to-jail, then get walked to jail: two placements.
        self.arrive(self.go_to_jail, Some(reason));
        self.arrive(self.jail, None);
    }

    fn turn(&mut self) {
        self.counters.turns += 1;

        let mut doubles = 0usize;

        loop {
            let (d1, d2) = self.roll();
            let double = d1 == d2;

            if double {
                doubles += 1;

                if doubles == 3 {
                    self.forced_to_jail(REASON_TRIPLE_DOUBLE);
                    break;
                }
            }

            let dest = self.sample_space();

            if dest == self.go_to_jail {
                self.forced_to_jail(REASON_SENT_TO_JAIL);
                break;
            }

            let reason = match self.spaces[dest].kind {
                SpaceKind::Chance(_) if self.rng.random_bool(CARD_REDIRECT_RATE) => {
                    Some(REASON_CHANCE)
                }
                SpaceKind::CommunityChest(_) if self.rng.random_bool(CARD_REDIRECT_RATE) => {
                    Some(REASON_COMM_CHEST)
                }
                _ => None,
            };

            self.arrive(dest, reason);

            if !double {
                break;
            }
        }

        if doubles > 0 {
            self.counters.doubles[doubles - 1] += 1;
        }
    }
}

impl SimulationEngine for SyntheticEngine {
    fn run(&mut self, ticks: u32) -> RawStatsChunk {
        for _ in 0..ticks {
            self.turn();
        }

        self.counters.clone()
    }

    fn spaces(&self) -> &[BoardSpace] {
        &self.spaces
    }

    fn reason_descriptions(&self) -> &[String] {
        &self.reason_descs
    }

    fn expected_frequencies(&self, variant: RuleVariant) -> Vec<f64> {
        let weights = arrival_weights(&self.spaces, variant);
        let total: f64 = weights.iter().sum();

        weights.iter().map(|w| w / total).collect()
    }
}

/// Creates seeded synthetic engines. Every generation starts from the same
/// seed, so a reinitialized run is reproducible.
#[derive(Debug, Clone)]
pub struct SyntheticFactory {
    pub seed: u64,
}

impl EngineFactory for SyntheticFactory {
    fn create(&self, variant: RuleVariant) -> Result<Box<dyn SimulationEngine>, EngineError> {
        Ok(Box::new(SyntheticEngine::new(variant, self.seed)))
    }
}

/// Relative arrival weight per space. Corners and mid-board spaces are
/// favoured slightly so the demo leaderboard is not flat; jail-wait shifts
/// mass toward the jail corner.
fn arrival_weights(spaces: &[BoardSpace], variant: RuleVariant) -> Vec<f64> {
    spaces
        .iter()
        .map(|s| match s.kind {
            SpaceKind::Jail => match variant {
                RuleVariant::JailWait => 2.2,
                RuleVariant::PayToExit => 1.4,
            },
            SpaceKind::GoToJail => 1.0,
            SpaceKind::Go => 1.2,
            SpaceKind::FreeParking => 1.1,
            SpaceKind::Rail(_) => 1.15,
            _ => 1.0,
        })
        .collect()
}

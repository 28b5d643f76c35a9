//! Display policy defaults.
//!
//! Pure rendering policy: none of these affect the underlying counters, only
//! how the next snapshot is presented.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Display-layer policy defaults.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, Copy)]
pub struct DisplayConfig {
    /// Split jail arrivals into held / just-visiting rows.
    #[serde(default = "default_true")]
    pub split_jail: bool,

    /// Render the full board instead of the top-K leaderboard.
    #[serde(default)]
    pub full_leaderboard: bool,

    /// Leaderboard rows shown when not rendering the full board.
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 128))]
    pub top_k: usize,
}

fn default_true() -> bool {
    true
}

fn default_top_k() -> usize {
    20
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            split_jail: default_true(),
            full_leaderboard: false,
            top_k: default_top_k(),
        }
    }
}

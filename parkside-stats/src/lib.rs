//! # Parkside Statistics
//!
//! Leaf crate for the Parkside board-arrival simulation driver: the board
//! space model, the stats decoder that unpacks the engine's flat counter
//! buffers, and the leaderboard aggregator that turns decoded snapshots into
//! ranked, display-ready rows.
//!
//! ## Key Components
//! - `space`: Immutable board space descriptors for the 40-space track.
//! - `snapshot`: `RawStatsChunk` -> `StatsSnapshot` decoding (stride-packed
//!   reason matrix materialization).
//! - `leaderboard`: Ranking with policy-controlled jail sub-bucketing and
//!   baseline error columns.
//! - `dice`: Dice-sum histogram report against the closed-form 2d6
//!   distribution.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod dice;
pub mod leaderboard;
pub mod snapshot;
pub mod space;

pub use dice::{dice_report, expected_fraction, DiceSumRow};
pub use leaderboard::{rank, reason_rows, JailBucket, LeaderboardEntry, LeaderboardPolicy};
pub use snapshot::{encode_reasons, DecodeError, RawStatsChunk, StatsSnapshot, TurnBreakdown};
pub use space::{find_space, standard_spaces, BoardSpace, SpaceKind, SPACE_COUNT, STANDARD_BOARD};

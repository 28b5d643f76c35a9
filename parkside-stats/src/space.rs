//! Immutable board space descriptors.
//!
//! A board is a fixed-size circular track of spaces. Space metadata is
//! fetched from the engine once per handle and never mutated afterwards;
//! everything downstream (decoder, leaderboard, display) refers to spaces by
//! stable index.

use serde::{Deserialize, Serialize};

/// Number of spaces on the standard track.
pub const SPACE_COUNT: usize = 40;

/// What kind of space occupies a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    Go,
    /// The jail corner. Arrivals here cover both players sent to jail and
    /// players just visiting; the leaderboard splits them on demand.
    Jail,
    FreeParking,
    /// The "go to jail" corner. Pieces never rest here; its counters are
    /// redirected into the jail space's sub-buckets for display.
    GoToJail,
    /// Ordinary property: colour set 0..=7, position within the set.
    Property(u8, u8),
    Rail(u8),
    Utility(u8),
    CommunityChest(u8),
    Chance(u8),
    Tax(u8),
}

impl SpaceKind {
    /// Short display tag, matching the wire codes the display layer keys on.
    pub fn code(&self) -> String {
        match self {
            SpaceKind::Go => "G".to_string(),
            SpaceKind::Jail => "J".to_string(),
            SpaceKind::FreeParking => "F".to_string(),
            SpaceKind::GoToJail => "g".to_string(),
            SpaceKind::Property(set, n) => format!("P{}{}", (set + b'A') as char, n + 1),
            SpaceKind::Rail(n) => format!("R{}", n + 1),
            SpaceKind::Utility(n) => format!("U{}", n + 1),
            SpaceKind::CommunityChest(n) => format!("C{}", n + 1),
            SpaceKind::Chance(n) => format!("c{}", n + 1),
            SpaceKind::Tax(n) => format!("T{}", n + 1),
        }
    }
}

/// One position on the circular track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpace {
    pub index: usize,
    pub kind: SpaceKind,
}

impl BoardSpace {
    pub fn new(index: usize, kind: SpaceKind) -> Self {
        Self { index, kind }
    }
}

/// Find the index of the first space matching a kind predicate.
pub fn find_space<F>(spaces: &[BoardSpace], check: F) -> Option<usize>
where
    F: Fn(&SpaceKind) -> bool,
{
    spaces.iter().position(|s| check(&s.kind))
}

use SpaceKind::*;

/// The standard 40-space layout, in track order from Go.
pub const STANDARD_BOARD: [SpaceKind; SPACE_COUNT] = [
    Go,
    Property(0, 0),
    CommunityChest(0),
    Property(0, 1),
    Tax(0),
    Rail(0),
    Property(1, 0),
    Chance(0),
    Property(1, 1),
    Property(1, 2),
    Jail,
    Property(2, 0),
    Utility(0),
    Property(2, 1),
    Property(2, 2),
    Rail(1),
    Property(3, 0),
    CommunityChest(1),
    Property(3, 1),
    Property(3, 2),
    FreeParking,
    Property(4, 0),
    Chance(1),
    Property(4, 1),
    Property(4, 2),
    Rail(2),
    Property(5, 0),
    Property(5, 1),
    Utility(1),
    Property(5, 2),
    GoToJail,
    Property(6, 0),
    Property(6, 1),
    CommunityChest(2),
    Property(6, 2),
    Rail(3),
    Chance(2),
    Property(7, 0),
    Tax(1),
    Property(7, 1),
];

/// Build `BoardSpace` descriptors for the standard layout.
pub fn standard_spaces() -> Vec<BoardSpace> {
    STANDARD_BOARD
        .iter()
        .enumerate()
        .map(|(index, kind)| BoardSpace::new(index, *kind))
        .collect()
}

//! Leaderboard aggregation: rank spaces by arrival frequency.
//!
//! The jail corner is the only space with display-policy sub-bucketing. The
//! engine counts every entry into jail as an arrival on the jail space and
//! files the forcing reasons under the go-to-jail space's reason row, so the
//! aggregator can split jail arrivals into "held" (sent to jail) and "just
//! visiting" without any extra engine support. The go-to-jail space itself is
//! never a resting destination and always ranks with value 0.

use serde::{Deserialize, Serialize};

use crate::snapshot::StatsSnapshot;
use crate::space::{BoardSpace, SpaceKind};

/// Jail sub-bucket tag. `Whole` for every non-jail space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JailBucket {
    Whole = 0,
    Held = 1,
    Visiting = 2,
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub space: usize,
    pub bucket: JailBucket,
    pub arrivals: u64,
    /// `arrivals / moves`, 0.0 when no moves have been made.
    pub observed: f64,
    /// Closed-form expected fraction, when a baseline is available.
    pub expected: Option<f64>,
    /// `observed - expected`; diagnostic only, never affects ranking.
    pub error: Option<f64>,
}

/// Display policy knobs that shape the ranking output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPolicy {
    /// Split jail arrivals into held / just-visiting rows.
    pub split_jail: bool,
    /// Show only the first K rows; `None` means the full board.
    pub top_k: Option<usize>,
}

impl Default for LeaderboardPolicy {
    fn default() -> Self {
        Self {
            split_jail: true,
            top_k: Some(20),
        }
    }
}

impl LeaderboardPolicy {
    /// Number of rows to render out of `total` ranked entries.
    pub fn visible(&self, total: usize) -> usize {
        match self.top_k {
            Some(k) => k.min(total),
            None => total,
        }
    }
}

fn fraction(value: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64
    }
}

/// Expected arrival fraction for an entry, folding the go-to-jail baseline
/// mass into the jail sub-buckets.
fn expected_for(
    baseline: Option<&[f64]>,
    entry_space: usize,
    bucket: JailBucket,
    jail: Option<usize>,
    go_to_jail: Option<usize>,
) -> Option<f64> {
    let baseline = baseline?;

    if Some(entry_space) == go_to_jail {
        return Some(0.0);
    }

    if Some(entry_space) == jail {
        let jail_freq = jail.map(|i| baseline[i]).unwrap_or(0.0);
        let g2j_freq = go_to_jail.map(|i| baseline[i]).unwrap_or(0.0);

        return Some(match bucket {
            JailBucket::Whole => jail_freq + g2j_freq,
            JailBucket::Held => g2j_freq,
            JailBucket::Visiting => jail_freq,
        });
    }

    Some(baseline[entry_space])
}

/// Rank every space by descending arrival count.
///
/// Ties break by ascending space index, then bucket tag, so equal counts
/// (common at low sample sizes) always order identically. The result covers
/// the whole board; `LeaderboardPolicy::visible` decides how much to render.
pub fn rank(
    snapshot: &StatsSnapshot,
    spaces: &[BoardSpace],
    policy: LeaderboardPolicy,
    baseline: Option<&[f64]>,
) -> Vec<LeaderboardEntry> {
    let jail = spaces.iter().position(|s| s.kind == SpaceKind::Jail);
    let go_to_jail = spaces.iter().position(|s| s.kind == SpaceKind::GoToJail);

    let mut entries = Vec::with_capacity(spaces.len() + 1);

    for space in spaces {
        match space.kind {
            SpaceKind::Jail => {
                let total = snapshot.arrivals[space.index];
                let held = go_to_jail
                    .map(|g| snapshot.reason_total(g))
                    .unwrap_or(0)
                    .min(total);

                if policy.split_jail {
                    entries.push((space.index, JailBucket::Held, held));
                    entries.push((space.index, JailBucket::Visiting, total - held));
                } else {
                    entries.push((space.index, JailBucket::Whole, total));
                }
            }
            SpaceKind::GoToJail => {
                // Redirected entirely into the jail sub-buckets.
                entries.push((space.index, JailBucket::Whole, 0));
            }
            _ => {
                entries.push((space.index, JailBucket::Whole, snapshot.arrivals[space.index]));
            }
        }
    }

    entries.sort_by_key(|(space, bucket, arrivals)| (std::cmp::Reverse(*arrivals), *space, *bucket));

    entries
        .into_iter()
        .map(|(space, bucket, arrivals)| {
            let observed = fraction(arrivals, snapshot.moves);
            let expected = expected_for(baseline, space, bucket, jail, go_to_jail);
            let error = expected.map(|e| observed - e);

            LeaderboardEntry {
                space,
                bucket,
                arrivals,
                observed,
                expected,
                error,
            }
        })
        .collect()
}

/// Arrival-reason breakdown for one ranked entry: `(reason index, count)`
/// pairs, zeros skipped, sorted descending by count then ascending by reason.
///
/// Jail rows other than just-visiting read their reasons from the go-to-jail
/// space's row, where the engine files forced-entry reasons.
pub fn reason_rows(
    snapshot: &StatsSnapshot,
    entry: &LeaderboardEntry,
    spaces: &[BoardSpace],
) -> Vec<(usize, u64)> {
    let kind = spaces[entry.space].kind;

    let source = match kind {
        SpaceKind::GoToJail => return Vec::new(),
        SpaceKind::Jail if entry.bucket == JailBucket::Visiting => return Vec::new(),
        SpaceKind::Jail => spaces
            .iter()
            .position(|s| s.kind == SpaceKind::GoToJail)
            .unwrap_or(entry.space),
        _ => entry.space,
    };

    let mut rows: Vec<(usize, u64)> = snapshot.reasons[source]
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .collect();

    rows.sort_by_key(|(reason, count)| (std::cmp::Reverse(*count), *reason));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RawStatsChunk;
    use crate::space::standard_spaces;

    const JAIL: usize = 10;
    const GO_TO_JAIL: usize = 30;

    fn snapshot_with(arrivals: Vec<u64>, g2j_reasons: Vec<u64>, moves: u64) -> StatsSnapshot {
        let spaces = arrivals.len();
        let reasons = g2j_reasons.len();

        let mut raw = RawStatsChunk::zeroed(spaces, reasons);
        raw.arrivals = arrivals;
        raw.moves = moves;

        for (i, count) in g2j_reasons.iter().enumerate() {
            raw.reasons_flat[GO_TO_JAIL * reasons + i] = *count;
        }

        StatsSnapshot::decode(raw, spaces, reasons).unwrap()
    }

    #[test]
    fn ranking_is_descending_with_index_tie_break() {
        let mut arrivals = vec![0u64; 40];
        arrivals[5] = 7;
        arrivals[3] = 7;
        arrivals[1] = 9;

        let snap = snapshot_with(arrivals, vec![0; 4], 23);
        let ranked = rank(
            &snap,
            &standard_spaces(),
            LeaderboardPolicy {
                split_jail: false,
                top_k: None,
            },
            None,
        );

        assert_eq!(ranked[0].space, 1);
        assert_eq!(ranked[1].space, 3);
        assert_eq!(ranked[2].space, 5);
        // Equal-count tail is ordered by ascending index.
        let tail: Vec<usize> = ranked[3..].iter().map(|e| e.space).collect();
        let mut sorted = tail.clone();
        sorted.sort_unstable();
        assert_eq!(tail, sorted);
    }

    #[test]
    fn ranking_is_idempotent() {
        let mut arrivals = vec![2u64; 40];
        arrivals[12] = 5;

        let snap = snapshot_with(arrivals, vec![1, 0, 2, 0], 83);
        let policy = LeaderboardPolicy::default();
        let spaces = standard_spaces();

        let first = rank(&snap, &spaces, policy, None);
        let second = rank(&snap, &spaces, policy, None);

        assert_eq!(first, second);
    }

    #[test]
    fn split_is_lossless_repartition_of_merged() {
        let mut arrivals = vec![0u64; 40];
        arrivals[JAIL] = 50;

        let snap = snapshot_with(arrivals, vec![10, 5, 15, 0], 100);
        let spaces = standard_spaces();

        let split = rank(
            &snap,
            &spaces,
            LeaderboardPolicy {
                split_jail: true,
                top_k: None,
            },
            None,
        );
        let merged = rank(
            &snap,
            &spaces,
            LeaderboardPolicy {
                split_jail: false,
                top_k: None,
            },
            None,
        );

        let held = split
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Held)
            .unwrap();
        let visiting = split
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Visiting)
            .unwrap();
        let whole = merged
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Whole)
            .unwrap();

        assert_eq!(held.arrivals, 30);
        assert_eq!(visiting.arrivals, 20);
        assert_eq!(held.arrivals + visiting.arrivals, whole.arrivals);
    }

    #[test]
    fn go_to_jail_always_ranks_zero() {
        let mut arrivals = vec![0u64; 40];
        arrivals[GO_TO_JAIL] = 42;
        arrivals[JAIL] = 42;

        let snap = snapshot_with(arrivals, vec![42, 0, 0, 0], 84);
        let ranked = rank(&snap, &standard_spaces(), LeaderboardPolicy::default(), None);

        let g2j = ranked.iter().find(|e| e.space == GO_TO_JAIL).unwrap();
        assert_eq!(g2j.arrivals, 0);
    }

    #[test]
    fn zero_moves_yields_zero_fractions() {
        let snap = snapshot_with(vec![0; 40], vec![0; 4], 0);
        let ranked = rank(&snap, &standard_spaces(), LeaderboardPolicy::default(), None);

        assert!(ranked.iter().all(|e| e.observed == 0.0));
    }

    #[test]
    fn baseline_produces_expected_and_error() {
        let mut arrivals = vec![0u64; 40];
        arrivals[0] = 25;

        let snap = snapshot_with(arrivals, vec![0; 4], 100);

        let mut baseline = vec![0.0f64; 40];
        baseline[0] = 0.05;
        baseline[JAIL] = 0.04;
        baseline[GO_TO_JAIL] = 0.03;

        let ranked = rank(
            &snap,
            &standard_spaces(),
            LeaderboardPolicy {
                split_jail: true,
                top_k: None,
            },
            Some(&baseline),
        );

        let go = ranked.iter().find(|e| e.space == 0).unwrap();
        assert_eq!(go.expected, Some(0.05));
        assert!((go.error.unwrap() - 0.20).abs() < 1e-12);

        let held = ranked
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Held)
            .unwrap();
        assert_eq!(held.expected, Some(0.03));

        let visiting = ranked
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Visiting)
            .unwrap();
        assert_eq!(visiting.expected, Some(0.04));

        let g2j = ranked.iter().find(|e| e.space == GO_TO_JAIL).unwrap();
        assert_eq!(g2j.expected, Some(0.0));
    }

    #[test]
    fn jail_reason_rows_come_from_go_to_jail_row() {
        let mut arrivals = vec![0u64; 40];
        arrivals[JAIL] = 30;

        let snap = snapshot_with(arrivals, vec![4, 0, 26, 0], 60);
        let spaces = standard_spaces();

        let ranked = rank(
            &snap,
            &spaces,
            LeaderboardPolicy {
                split_jail: true,
                top_k: None,
            },
            None,
        );
        let held = ranked
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Held)
            .unwrap();

        let rows = reason_rows(&snap, held, &spaces);
        assert_eq!(rows, vec![(2, 26), (0, 4)]);

        let visiting = ranked
            .iter()
            .find(|e| e.space == JAIL && e.bucket == JailBucket::Visiting)
            .unwrap();
        assert!(reason_rows(&snap, visiting, &spaces).is_empty());
    }

    #[test]
    fn policy_visible_caps_row_count() {
        let policy = LeaderboardPolicy {
            split_jail: false,
            top_k: Some(20),
        };

        assert_eq!(policy.visible(41), 20);
        assert_eq!(policy.visible(5), 5);

        let full = LeaderboardPolicy {
            split_jail: false,
            top_k: None,
        };
        assert_eq!(full.visible(41), 41);
    }
}

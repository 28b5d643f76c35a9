//! Dice-sum histogram report.
//!
//! The engine tracks how often each two-die sum (2..=12) was thrown. The
//! report compares observed frequencies against the closed-form distribution
//! `min(sum - 1, 13 - sum) / 36`; the signed error is diagnostic only.

use serde::{Deserialize, Serialize};

use crate::snapshot::StatsSnapshot;

/// One histogram bucket, display-ready.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceSumRow {
    pub sum: u8,
    pub count: u64,
    /// Fraction of all throws, 0.0 when nothing has been thrown.
    pub observed: f64,
    /// Closed-form probability of this sum with two fair dice.
    pub expected: f64,
    /// `observed - expected`.
    pub error: f64,
}

/// Probability of rolling `sum` with two fair six-sided dice.
pub fn expected_fraction(sum: u8) -> f64 {
    debug_assert!((2..=12).contains(&sum));
    u64::min(sum as u64 - 1, 13 - sum as u64) as f64 / 36.0
}

/// Build the 11-row dice-sum report for a snapshot.
pub fn dice_report(snapshot: &StatsSnapshot) -> Vec<DiceSumRow> {
    let total = snapshot.total_rolls();

    snapshot
        .roll_freq
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let sum = i as u8 + 2;
            let observed = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            let expected = expected_fraction(sum);

            DiceSumRow {
                sum,
                count,
                observed,
                expected,
                error: observed - expected,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RawStatsChunk;

    fn snapshot_with_rolls(roll_freq: [u64; 11]) -> StatsSnapshot {
        let mut raw = RawStatsChunk::zeroed(1, 0);
        raw.roll_freq = roll_freq;
        StatsSnapshot::decode(raw, 1, 0).unwrap()
    }

    #[test]
    fn expected_distribution_is_symmetric_and_sums_to_one() {
        let total: f64 = (2..=12).map(expected_fraction).sum();
        assert!((total - 1.0).abs() < 1e-12);

        assert_eq!(expected_fraction(2), expected_fraction(12));
        assert_eq!(expected_fraction(7), 6.0 / 36.0);
    }

    #[test]
    fn uniform_histogram_error_is_uniform_minus_expected() {
        let snap = snapshot_with_rolls([99; 11]);
        let report = dice_report(&snap);

        let uniform = 1.0 / 11.0;

        for row in &report {
            let want = uniform - expected_fraction(row.sum);
            assert!((row.error - want).abs() < 1e-12, "sum {}", row.sum);
        }

        // Sign pattern: under-represented in the middle, over at the edges.
        assert!(report[0].error > 0.0); // sum 2
        assert!(report[5].error < 0.0); // sum 7
    }

    #[test]
    fn empty_histogram_yields_zero_observed() {
        let snap = snapshot_with_rolls([0; 11]);
        let report = dice_report(&snap);

        for row in &report {
            assert_eq!(row.count, 0);
            assert_eq!(row.observed, 0.0);
            assert!((row.error + row.expected).abs() < 1e-12);
        }
    }

    #[test]
    fn exact_match_has_zero_error() {
        // One full cycle of the theoretical distribution: 36 throws.
        let snap = snapshot_with_rolls([1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1]);
        let report = dice_report(&snap);

        for row in &report {
            assert!(row.error.abs() < 1e-12, "sum {}", row.sum);
        }
    }
}

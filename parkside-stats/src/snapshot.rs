//! Raw engine counters and their decoded, display-ready form.
//!
//! The engine reports progress as one flat numeric blob per chunk: scalar
//! counters, fixed histograms, a per-space arrival vector and a row-major,
//! stride-packed reason matrix. Decoding materializes the matrix into one
//! reason vector per space. All counters are cumulative for the life of a
//! single engine handle and reset only on reinitialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The flat reason buffer does not factor into `spaces * reasons`.
    /// Indicates an engine/protocol version mismatch; fatal to the session.
    #[error("reason buffer length {actual} != {spaces} spaces x {reasons} reasons")]
    LengthMismatch {
        actual: usize,
        spaces: usize,
        reasons: usize,
    },

    /// The arrival vector length does not match the space count.
    #[error("arrival vector length {actual} != {spaces} spaces")]
    ArrivalMismatch { actual: usize, spaces: usize },
}

/// The engine's per-invocation output, still stride-packed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatsChunk {
    /// Cumulative turns taken.
    pub turns: u64,
    /// Cumulative piece placements.
    pub moves: u64,
    /// Turns ending after exactly one double, two doubles, three doubles.
    pub doubles: [u64; 3],
    /// Dice-sum histogram, sums 2..=12.
    pub roll_freq: [u64; 11],
    /// Arrivals per space, length = space count.
    pub arrivals: Vec<u64>,
    /// Row-major arrival-reason counters, `spaces * reasons` long.
    pub reasons_flat: Vec<u64>,
}

impl RawStatsChunk {
    /// Empty counters for `spaces` spaces and `reasons` reason columns.
    pub fn zeroed(spaces: usize, reasons: usize) -> Self {
        Self {
            turns: 0,
            moves: 0,
            doubles: [0; 3],
            roll_freq: [0; 11],
            arrivals: vec![0; spaces],
            reasons_flat: vec![0; spaces * reasons],
        }
    }
}

/// Decoded statistics for one completed chunk. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub turns: u64,
    pub moves: u64,
    pub doubles: [u64; 3],
    pub roll_freq: [u64; 11],
    pub arrivals: Vec<u64>,
    /// One fixed-length reason vector per space.
    pub reasons: Vec<Vec<u64>>,
}

impl StatsSnapshot {
    /// Decode a raw chunk, slicing the stride-packed reason matrix into
    /// per-space vectors.
    ///
    /// `reasons` is the engine-reported reason column count. A buffer whose
    /// length is not exactly `spaces * reasons` is rejected, never truncated.
    pub fn decode(raw: RawStatsChunk, spaces: usize, reasons: usize) -> Result<Self, DecodeError> {
        if raw.arrivals.len() != spaces {
            return Err(DecodeError::ArrivalMismatch {
                actual: raw.arrivals.len(),
                spaces,
            });
        }

        if raw.reasons_flat.len() != spaces * reasons {
            return Err(DecodeError::LengthMismatch {
                actual: raw.reasons_flat.len(),
                spaces,
                reasons,
            });
        }

        let decoded = raw
            .reasons_flat
            .chunks_exact(reasons.max(1))
            .map(|row| row.to_vec())
            .collect::<Vec<_>>();

        // chunks_exact(1) over an empty buffer yields nothing; normalize the
        // degenerate zero-reason case to one empty row per space.
        let decoded = if reasons == 0 {
            vec![Vec::new(); spaces]
        } else {
            decoded
        };

        Ok(Self {
            turns: raw.turns,
            moves: raw.moves,
            doubles: raw.doubles,
            roll_freq: raw.roll_freq,
            arrivals: raw.arrivals,
            reasons: decoded,
        })
    }

    /// Sum of one space's reason vector.
    pub fn reason_total(&self, space: usize) -> u64 {
        self.reasons[space].iter().sum()
    }

    /// Total dice throws recorded in the histogram.
    pub fn total_rolls(&self) -> u64 {
        self.roll_freq.iter().sum()
    }

    /// Derived turn statistics for the display layer.
    pub fn turn_breakdown(&self) -> TurnBreakdown {
        let double_turns = self.doubles[0];
        let triple_turns = self.doubles[1] + self.doubles[2];
        let single_turns = self.turns.saturating_sub(double_turns + triple_turns);

        // One extra throw per double, two per double-double, three when the
        // third double sends the piece to jail.
        let extra_throws = self.doubles[0] + 2 * self.doubles[1] + 3 * self.doubles[2];

        TurnBreakdown {
            single_turns,
            double_turns,
            triple_turns,
            extra_throws,
        }
    }
}

/// Pack per-space reason vectors back into a flat stride-R buffer.
///
/// Inverse of the decode slicing; the driver never sends this direction, it
/// exists for fixture construction and the round-trip property.
pub fn encode_reasons(rows: &[Vec<u64>]) -> Vec<u64> {
    rows.iter().flatten().copied().collect()
}

/// Turn statistics derived from the doubles buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBreakdown {
    pub single_turns: u64,
    pub double_turns: u64,
    pub triple_turns: u64,
    pub extra_throws: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk_with_reasons(spaces: usize, reasons: usize, flat: Vec<u64>) -> RawStatsChunk {
        RawStatsChunk {
            turns: 10,
            moves: 12,
            doubles: [3, 1, 0],
            roll_freq: [1; 11],
            arrivals: vec![1; spaces],
            reasons_flat: flat,
        }
    }

    #[test]
    fn decode_slices_rows_in_order() {
        let raw = chunk_with_reasons(3, 2, vec![1, 2, 3, 4, 5, 6]);
        let snap = StatsSnapshot::decode(raw, 3, 2).unwrap();

        assert_eq!(snap.reasons, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let raw = chunk_with_reasons(3, 2, vec![1, 2, 3, 4, 5]);

        assert_eq!(
            StatsSnapshot::decode(raw, 3, 2),
            Err(DecodeError::LengthMismatch {
                actual: 5,
                spaces: 3,
                reasons: 2
            })
        );
    }

    #[test]
    fn decode_rejects_oversized_buffer() {
        let raw = chunk_with_reasons(3, 2, vec![0; 7]);

        assert!(StatsSnapshot::decode(raw, 3, 2).is_err());
    }

    #[test]
    fn decode_rejects_arrival_length_mismatch() {
        let mut raw = chunk_with_reasons(3, 2, vec![0; 6]);
        raw.arrivals = vec![0; 4];

        assert_eq!(
            StatsSnapshot::decode(raw, 3, 2),
            Err(DecodeError::ArrivalMismatch {
                actual: 4,
                spaces: 3
            })
        );
    }

    #[test]
    fn zero_reason_columns_decode_to_empty_rows() {
        let raw = chunk_with_reasons(4, 0, Vec::new());
        let snap = StatsSnapshot::decode(raw, 4, 0).unwrap();

        assert_eq!(snap.reasons, vec![Vec::<u64>::new(); 4]);
    }

    #[test]
    fn turn_breakdown_counts_extra_throws() {
        let raw = chunk_with_reasons(1, 0, Vec::new());
        let snap = StatsSnapshot::decode(raw, 1, 0).unwrap();
        let breakdown = snap.turn_breakdown();

        assert_eq!(breakdown.single_turns, 6);
        assert_eq!(breakdown.double_turns, 3);
        assert_eq!(breakdown.triple_turns, 1);
        assert_eq!(breakdown.extra_throws, 3 + 2);
    }

    proptest! {
        #[test]
        fn encode_decode_round_trip(
            rows in prop::collection::vec(
                prop::collection::vec(any::<u64>(), 0..8),
                0..16,
            ),
            width in 0usize..8,
        ) {
            // Force every row to the same stride before encoding.
            let rows: Vec<Vec<u64>> = rows
                .into_iter()
                .map(|mut r| {
                    r.resize(width, 0);
                    r
                })
                .collect();

            let spaces = rows.len();
            let flat = encode_reasons(&rows);

            let raw = RawStatsChunk {
                turns: 0,
                moves: 0,
                doubles: [0; 3],
                roll_freq: [0; 11],
                arrivals: vec![0; spaces],
                reasons_flat: flat,
            };

            let snap = StatsSnapshot::decode(raw, spaces, width).unwrap();
            prop_assert_eq!(snap.reasons, rows);
        }
    }
}

//! Display boundary: rendered updates pushed to a pluggable sink.
//!
//! The coordinator owns the rendering policy (jail split, leaderboard depth)
//! and republishes the last snapshot through here whenever either the data
//! or the policy changes. Sinks only format and present; they never touch
//! counters.

use std::sync::Arc;

use parkside_engine::RuleVariant;
use parkside_stats::{
    dice_report, rank, reason_rows, BoardSpace, DiceSumRow, JailBucket, LeaderboardEntry,
    LeaderboardPolicy, SpaceKind, StatsSnapshot, TurnBreakdown,
};

use crate::protocol::Generation;

/// Receives rendered updates. Implementations run on the coordinator task
/// and must not block.
pub trait DisplaySink: Send {
    fn publish(&mut self, update: DisplayUpdate);
}

/// One reason (or pseudo-reason) breakdown line under a leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRow {
    pub label: String,
    pub count: u64,
}

/// One rendered leaderboard row with its reason breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub entry: LeaderboardEntry,
    pub label: String,
    pub detail: Vec<SubRow>,
}

/// Everything a sink needs to render one refresh.
#[derive(Debug, Clone)]
pub struct DisplayUpdate {
    pub generation: Generation,
    pub variant: RuleVariant,
    pub snapshot: Arc<StatsSnapshot>,
    pub breakdown: TurnBreakdown,
    pub leaderboard: Vec<LeaderboardRow>,
    pub dice: Vec<DiceSumRow>,
    pub reached_target: bool,
}

fn row_label(space: &BoardSpace, bucket: JailBucket) -> String {
    let code = space.kind.code();
    match bucket {
        JailBucket::Whole => code,
        JailBucket::Held => format!("{code} (in jail)"),
        JailBucket::Visiting => format!("{code} (just visiting)"),
    }
}

/// Build a rendered update from a decoded snapshot under the given policy.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_update(
    snapshot: Arc<StatsSnapshot>,
    spaces: &[BoardSpace],
    reason_descriptions: &[String],
    policy: LeaderboardPolicy,
    baseline: Option<&[f64]>,
    variant: RuleVariant,
    generation: Generation,
    reached_target: bool,
) -> DisplayUpdate {
    let entries = rank(&snapshot, spaces, policy, baseline);
    let visible = policy.visible(entries.len());
    let jail = parkside_stats::find_space(spaces, |k| *k == SpaceKind::Jail);

    let leaderboard = entries
        .into_iter()
        .take(visible)
        .map(|entry| {
            let mut detail: Vec<SubRow> = reason_rows(&snapshot, &entry, spaces)
                .into_iter()
                .map(|(reason, count)| SubRow {
                    label: reason_descriptions
                        .get(reason)
                        .cloned()
                        .unwrap_or_else(|| format!("Reason {reason}")),
                    count,
                })
                .collect();

            // The merged jail row keeps the just-visiting share legible as a
            // pseudo-reason line.
            if Some(entry.space) == jail && entry.bucket == JailBucket::Whole {
                let held: u64 = detail.iter().map(|row| row.count).sum();
                detail.push(SubRow {
                    label: "Just Visiting".to_string(),
                    count: entry.arrivals.saturating_sub(held),
                });
            }

            let label = row_label(&spaces[entry.space], entry.bucket);

            LeaderboardRow {
                entry,
                label,
                detail,
            }
        })
        .collect();

    let breakdown = snapshot.turn_breakdown();
    let dice = dice_report(&snapshot);

    DisplayUpdate {
        generation,
        variant,
        snapshot,
        breakdown,
        leaderboard,
        dice,
        reached_target,
    }
}

//! Console rendering for driver updates.

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use parkside_driver::{DisplaySink, DisplayUpdate};

/// Log a progress line at most once per this many updates.
const PROGRESS_EVERY: u64 = 200;

/// Renders full tables when a run pauses at its target; in between it emits
/// occasional progress lines so long runs stay observable. Signals each
/// pause over `paused` so the command loop can resume or exit.
pub struct ConsoleSink {
    paused: UnboundedSender<()>,
    updates_seen: u64,
}

impl ConsoleSink {
    pub fn new(paused: UnboundedSender<()>) -> Self {
        Self {
            paused,
            updates_seen: 0,
        }
    }

    fn render_tables(&self, update: &DisplayUpdate) {
        let snapshot = &update.snapshot;
        let breakdown = update.breakdown;

        println!();
        println!(
            "=== {} | {} turns, {} moves ===",
            update.variant, snapshot.turns, snapshot.moves
        );
        println!(
            "turns: {} single, {} double, {} triple ({} extra throws)",
            breakdown.single_turns,
            breakdown.double_turns,
            breakdown.triple_turns,
            breakdown.extra_throws
        );

        println!();
        println!("{:<22} {:>12} {:>9} {:>9} {:>9}", "space", "arrivals", "obs", "exp", "err");
        for row in &update.leaderboard {
            let expected = row
                .entry
                .expected
                .map(|e| format!("{e:>9.5}"))
                .unwrap_or_else(|| format!("{:>9}", "-"));
            let error = row
                .entry
                .error
                .map(|e| format!("{e:>+9.5}"))
                .unwrap_or_else(|| format!("{:>9}", "-"));

            println!(
                "{:<22} {:>12} {:>9.5} {} {}",
                row.label, row.entry.arrivals, row.entry.observed, expected, error
            );

            for sub in &row.detail {
                println!("    {:<18} {:>12}", sub.label, sub.count);
            }
        }

        println!();
        println!("{:>4} {:>12} {:>9} {:>9} {:>9}", "sum", "count", "obs", "exp", "err");
        for row in &update.dice {
            println!(
                "{:>4} {:>12} {:>9.5} {:>9.5} {:>+9.5}",
                row.sum, row.count, row.observed, row.expected, row.error
            );
        }
    }
}

impl DisplaySink for ConsoleSink {
    fn publish(&mut self, update: DisplayUpdate) {
        self.updates_seen += 1;

        if update.reached_target {
            self.render_tables(&update);
            let _ = self.paused.send(());
            return;
        }

        if self.updates_seen % PROGRESS_EVERY == 0 {
            info!(
                turns = update.snapshot.turns,
                generation = %update.generation,
                "simulation progress"
            );
        }
    }
}

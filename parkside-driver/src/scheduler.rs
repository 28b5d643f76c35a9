//! Time-budgeted execution scheduler.
//!
//! Owns the live engine handle on a dedicated thread and advances it in
//! bounded chunks so control commands are never starved. Work is organized
//! into slots: one slot runs chunks back to back until the wall-clock budget
//! elapses, a command arrives, or the tick target is reached. Between slots
//! the thread drains its command inbox, which is the explicit yield point
//! reinitialization and stop rely on.
//!
//! Progress is tracked from the engine-reported cumulative `turns`, never by
//! accumulating requests locally, so an engine that consumes fewer ticks
//! than asked stays correctly accounted.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use parkside_config::SchedulerConfig;
use parkside_engine::{EngineFactory, SimulationEngine};
use parkside_stats::StatsSnapshot;
use parkside_telemetry::MetricsRecorder;

use crate::error::DriverError;
use crate::protocol::{Generation, WorkerCommand, WorkerEvent};

pub struct ExecutionScheduler {
    factory: Arc<dyn EngineFactory>,
    config: SchedulerConfig,
    metrics: MetricsRecorder,
    commands: Receiver<WorkerCommand>,
    events: UnboundedSender<WorkerEvent>,

    engine: Option<Box<dyn SimulationEngine>>,
    generation: Generation,
    running: bool,
    /// Engine-reported cumulative turns for the live handle.
    current_ticks: u64,
    target_ticks: u64,
    space_count: usize,
    reason_count: usize,
}

impl ExecutionScheduler {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        config: SchedulerConfig,
        metrics: MetricsRecorder,
        commands: Receiver<WorkerCommand>,
        events: UnboundedSender<WorkerEvent>,
    ) -> Self {
        Self {
            factory,
            config,
            metrics,
            commands,
            events,
            engine: None,
            generation: Generation::default(),
            running: false,
            current_ticks: 0,
            target_ticks: 0,
            space_count: 0,
            reason_count: 0,
        }
    }

    /// Run the scheduler on a dedicated named thread.
    pub fn spawn(self) -> std::io::Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new()
            .name("parkside-exec".to_string())
            .spawn(move || self.run_loop())
    }

    /// Blocking scheduler loop. Idle until a command arrives; while running,
    /// poll the inbox between slots so stop and reinitialize are observed at
    /// chunk boundaries.
    pub fn run_loop(mut self) {
        loop {
            let command = if self.running {
                match self.commands.try_recv() {
                    Ok(command) => Some(command),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match self.commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                }
            };

            if let Some(command) = command {
                if self.handle(command).is_break() {
                    break;
                }
                // Drain queued commands before burning another slot.
                continue;
            }

            if self.running {
                self.run_slot();
            }
        }

        debug!("execution thread exiting");
    }

    fn handle(&mut self, command: WorkerCommand) -> ControlFlow<()> {
        match command {
            WorkerCommand::Initialize {
                variant,
                generation,
            } => {
                self.generation = generation;
                self.running = false;
                self.current_ticks = 0;
                self.target_ticks = 0;

                match self.factory.create(variant) {
                    Ok(engine) => {
                        let spaces = engine.spaces().to_vec();
                        let reason_descriptions = engine.reason_descriptions().to_vec();
                        self.space_count = spaces.len();
                        self.reason_count = reason_descriptions.len();
                        self.engine = Some(engine);

                        info!(%generation, %variant, "engine handle initialized");
                        let _ = self.events.send(WorkerEvent::Ready {
                            generation,
                            spaces,
                            reason_descriptions,
                        });
                    }
                    Err(err) => {
                        self.engine = None;
                        let _ = self.events.send(WorkerEvent::Fatal(DriverError::Engine(err)));
                    }
                }
            }

            WorkerCommand::ComputeBaseline {
                variant,
                generation,
            } => {
                if let Some(engine) = self.engine.as_ref() {
                    let frequencies = engine.expected_frequencies(variant);
                    let _ = self.events.send(WorkerEvent::Baseline {
                        generation,
                        frequencies,
                    });
                } else {
                    warn!(%generation, "baseline requested without a live handle");
                }
            }

            WorkerCommand::Start { raise_by } => {
                if self.engine.is_some() {
                    self.target_ticks = self.current_ticks + raise_by;
                    self.running = true;
                    debug!(
                        current = self.current_ticks,
                        target = self.target_ticks,
                        "scheduling started"
                    );
                } else {
                    warn!("start requested without a live handle");
                }
            }

            WorkerCommand::Stop => {
                self.running = false;
            }

            WorkerCommand::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Run chunks until the slot budget elapses, a command is waiting, or
    /// the target is reached. Each chunk requests at most
    /// `min(remaining, chunk_size)` ticks, so progress never overshoots the
    /// target.
    fn run_slot(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            self.running = false;
            return;
        };

        let budget = Duration::from_millis(self.config.slot_budget_ms);
        let slot_start = Instant::now();

        loop {
            let remaining = self.target_ticks.saturating_sub(self.current_ticks);
            if remaining == 0 {
                self.running = false;
                break;
            }

            let chunk = remaining.min(self.config.chunk_size as u64) as u32;
            let raw = engine.run(chunk);

            let before = self.current_ticks;
            self.current_ticks = raw.turns;

            let snapshot = match StatsSnapshot::decode(raw, self.space_count, self.reason_count) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    self.running = false;
                    let _ = self.events.send(WorkerEvent::Fatal(DriverError::Decode(err)));
                    break;
                }
            };

            self.metrics
                .ticks_total
                .inc_by(self.current_ticks.saturating_sub(before) as f64);

            trace!(
                requested = chunk,
                current = self.current_ticks,
                target = self.target_ticks,
                "chunk complete"
            );

            let reached_target = self.current_ticks >= self.target_ticks;
            if reached_target {
                self.running = false;
                info!(
                    generation = %self.generation,
                    ticks = self.current_ticks,
                    "tick target reached, pausing"
                );
            }

            let _ = self.events.send(WorkerEvent::Chunk {
                generation: self.generation,
                snapshot: Arc::new(snapshot),
                reached_target,
            });

            if reached_target {
                break;
            }

            // A waiting command ends the slot early; stop and reinitialize
            // take effect at chunk boundaries.
            if !self.commands.is_empty() {
                break;
            }

            if slot_start.elapsed() >= budget {
                break;
            }
        }

        self.metrics
            .slot_duration
            .observe(slot_start.elapsed().as_secs_f64());
    }
}

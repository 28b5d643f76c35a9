//! Session coordinator: the driver's control-side state machine.
//!
//! Runs as an async task, multiplexing user commands against events from the
//! execution thread. It owns the display policy and the current generation;
//! the execution thread owns the engine handle and all tick accounting. Any
//! event tagged with a superseded generation is dropped here, so a
//! reinitialization racing an in-flight chunk can never pollute the fresh
//! counters.

use std::ops::ControlFlow;
use std::sync::Arc;

use crossbeam_channel::Sender;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use parkside_config::ParksideConfig;
use parkside_engine::RuleVariant;
use parkside_stats::{BoardSpace, LeaderboardPolicy, StatsSnapshot};
use parkside_telemetry::MetricsRecorder;

use crate::display::{render_update, DisplaySink};
use crate::error::DriverError;
use crate::protocol::{Generation, WorkerCommand, WorkerEvent};
use crate::session::SessionOptions;

/// Coordinator lifecycle. `Paused` and `Running` are the only states that
/// accept a start/stop; everything earlier is still waiting on the
/// execution thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Initializing,
    ComputingBaseline,
    Paused,
    Running,
}

/// User-facing control commands, delivered through [`crate::DriverSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    /// Reinitialize under a specific rule variant.
    SetVariant(RuleVariant),
    /// Reinitialize under the opposite rule variant.
    ToggleVariant,
    ToggleJailSplit,
    ToggleFullLeaderboard,
    Shutdown,
}

pub struct Coordinator {
    config: ParksideConfig,
    metrics: MetricsRecorder,
    to_worker: Sender<WorkerCommand>,
    display: Box<dyn DisplaySink>,

    state: DriverState,
    generation: Generation,
    variant: RuleVariant,
    /// Start as soon as the next baseline lands.
    start_pending: bool,

    spaces: Vec<BoardSpace>,
    reason_descriptions: Vec<String>,
    baseline: Option<Vec<f64>>,
    policy: LeaderboardPolicy,
    last_snapshot: Option<Arc<StatsSnapshot>>,
}

impl Coordinator {
    pub fn new(
        config: ParksideConfig,
        metrics: MetricsRecorder,
        to_worker: Sender<WorkerCommand>,
        display: Box<dyn DisplaySink>,
        options: SessionOptions,
    ) -> Self {
        let policy = LeaderboardPolicy {
            split_jail: config.display.split_jail,
            top_k: if config.display.full_leaderboard {
                None
            } else {
                Some(config.display.top_k as usize)
            },
        };

        Self {
            config,
            metrics,
            to_worker,
            display,
            state: DriverState::Uninitialized,
            generation: Generation::default(),
            variant: options.variant,
            start_pending: options.autostart,
            spaces: Vec::new(),
            reason_descriptions: Vec::new(),
            baseline: None,
            policy,
            last_snapshot: None,
        }
    }

    /// Drive the session until shutdown or a fatal error.
    pub async fn run(
        &mut self,
        mut commands: UnboundedReceiver<SessionCommand>,
        mut events: UnboundedReceiver<WorkerEvent>,
    ) -> Result<(), DriverError> {
        self.initialize()?;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.handle_command(command)?.is_break() {
                            return Ok(());
                        }
                    }
                    // All session handles dropped; wind down the worker.
                    None => {
                        let _ = self.to_worker.send(WorkerCommand::Shutdown);
                        return Ok(());
                    }
                },
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event)?,
                    None => return Err(DriverError::WorkerGone),
                },
            }
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn send(&self, command: WorkerCommand) -> Result<(), DriverError> {
        self.to_worker
            .send(command)
            .map_err(|_| DriverError::WorkerGone)
    }

    fn initialize(&mut self) -> Result<(), DriverError> {
        self.state = DriverState::Initializing;
        self.send(WorkerCommand::Initialize {
            variant: self.variant,
            generation: self.generation,
        })
    }

    fn start(&mut self) -> Result<(), DriverError> {
        self.send(WorkerCommand::Start {
            raise_by: self.config.scheduler.pause_interval,
        })?;
        self.state = DriverState::Running;
        Ok(())
    }

    /// Bump the generation and replace the engine handle. Everything tied to
    /// the old handle (baseline, snapshot, metadata) is invalidated now;
    /// in-flight results from the old generation get dropped on arrival.
    fn reinitialize(&mut self, variant: RuleVariant) -> Result<(), DriverError> {
        let resume = self.state == DriverState::Running || self.start_pending;

        self.generation = self.generation.next();
        self.variant = variant;
        self.baseline = None;
        self.last_snapshot = None;
        self.spaces.clear();
        self.reason_descriptions.clear();
        self.start_pending = resume;

        info!(generation = %self.generation, %variant, "reinitializing session");
        self.initialize()
    }

    fn handle_command(&mut self, command: SessionCommand) -> Result<ControlFlow<()>, DriverError> {
        match command {
            SessionCommand::Start => match self.state {
                DriverState::Paused => self.start()?,
                DriverState::Initializing | DriverState::ComputingBaseline => {
                    self.start_pending = true;
                }
                _ => {}
            },

            SessionCommand::Stop => {
                self.start_pending = false;
                if self.state == DriverState::Running {
                    self.send(WorkerCommand::Stop)?;
                    self.state = DriverState::Paused;
                }
            }

            SessionCommand::SetVariant(variant) => {
                if variant != self.variant {
                    self.reinitialize(variant)?;
                }
            }

            SessionCommand::ToggleVariant => {
                let variant = self.variant.toggled();
                self.reinitialize(variant)?;
            }

            SessionCommand::ToggleJailSplit => {
                self.policy.split_jail = !self.policy.split_jail;
                self.publish(false);
            }

            SessionCommand::ToggleFullLeaderboard => {
                self.policy.top_k = match self.policy.top_k {
                    Some(_) => None,
                    None => Some(self.config.display.top_k as usize),
                };
                self.publish(false);
            }

            SessionCommand::Shutdown => {
                let _ = self.to_worker.send(WorkerCommand::Shutdown);
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn handle_event(&mut self, event: WorkerEvent) -> Result<(), DriverError> {
        match event {
            WorkerEvent::Ready {
                generation,
                spaces,
                reason_descriptions,
            } => {
                if generation != self.generation {
                    debug!(%generation, "dropping ready event from superseded handle");
                    return Ok(());
                }

                self.spaces = spaces;
                self.reason_descriptions = reason_descriptions;
                self.state = DriverState::ComputingBaseline;
                self.send(WorkerCommand::ComputeBaseline {
                    variant: self.variant,
                    generation,
                })?;
            }

            WorkerEvent::Baseline {
                generation,
                frequencies,
            } => {
                if generation != self.generation {
                    debug!(%generation, "dropping baseline from superseded handle");
                    return Ok(());
                }

                self.baseline = Some(frequencies);
                self.state = DriverState::Paused;

                if self.start_pending {
                    self.start_pending = false;
                    self.start()?;
                }
            }

            WorkerEvent::Chunk {
                generation,
                snapshot,
                reached_target,
            } => {
                if generation != self.generation {
                    warn!(
                        stale = %generation,
                        current = %self.generation,
                        "dropping stale snapshot"
                    );
                    self.metrics.stale_snapshots.inc();
                    return Ok(());
                }

                self.metrics.chunks_completed.inc();
                self.last_snapshot = Some(snapshot);

                if reached_target {
                    self.state = DriverState::Paused;
                }

                self.publish(reached_target);
            }

            WorkerEvent::Fatal(err) => return Err(err),
        }

        Ok(())
    }

    /// Re-render the last snapshot under the current policy and push it to
    /// the sink. No-op before the first chunk lands.
    fn publish(&mut self, reached_target: bool) {
        let Some(snapshot) = self.last_snapshot.as_ref() else {
            return;
        };

        let update = render_update(
            Arc::clone(snapshot),
            &self.spaces,
            &self.reason_descriptions,
            self.policy,
            self.baseline.as_deref(),
            self.variant,
            self.generation,
            reached_target,
        );

        self.display.publish(update);
    }
}

//! Session façade: wires the coordinator task to the execution thread and
//! exposes fire-and-forget control methods.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use parkside_config::ParksideConfig;
use parkside_engine::{EngineFactory, RuleVariant};
use parkside_telemetry::MetricsRecorder;

use crate::coordinator::{Coordinator, SessionCommand};
use crate::display::DisplaySink;
use crate::error::DriverError;
use crate::scheduler::ExecutionScheduler;

/// Initial session parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub variant: RuleVariant,
    /// Begin scheduling as soon as the baseline is ready instead of waiting
    /// for an explicit start.
    pub autostart: bool,
}

/// A live driver session.
///
/// Control methods are fire-and-forget; they enqueue a command for the
/// coordinator and return immediately. Dropping the session without calling
/// [`DriverSession::shutdown`] still winds the worker down, but discards the
/// session outcome.
pub struct DriverSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<Result<(), DriverError>>,
}

impl DriverSession {
    /// Spawn the execution thread and coordinator task, initialize the first
    /// engine handle, and return a control handle.
    pub fn spawn(
        config: ParksideConfig,
        factory: Arc<dyn EngineFactory>,
        display: Box<dyn DisplaySink>,
        metrics: MetricsRecorder,
        options: SessionOptions,
    ) -> Result<Self, DriverError> {
        let (worker_tx, worker_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let scheduler = ExecutionScheduler::new(
            factory,
            config.scheduler,
            metrics.clone(),
            worker_rx,
            event_tx,
        );
        let worker = scheduler.spawn()?;

        let mut coordinator = Coordinator::new(config, metrics, worker_tx, display, options);

        let task = tokio::spawn(async move {
            let result = coordinator.run(command_rx, event_rx).await;

            // The worker exits promptly once its command channel closes or a
            // shutdown lands; join it off the async runtime.
            let _ = tokio::task::spawn_blocking(move || worker.join()).await;

            result
        });

        Ok(Self {
            commands: command_tx,
            task,
        })
    }

    pub fn start(&self) {
        let _ = self.commands.send(SessionCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.commands.send(SessionCommand::Stop);
    }

    pub fn set_variant(&self, variant: RuleVariant) {
        let _ = self.commands.send(SessionCommand::SetVariant(variant));
    }

    pub fn toggle_variant(&self) {
        let _ = self.commands.send(SessionCommand::ToggleVariant);
    }

    pub fn toggle_jail_split(&self) {
        let _ = self.commands.send(SessionCommand::ToggleJailSplit);
    }

    pub fn toggle_full_leaderboard(&self) {
        let _ = self.commands.send(SessionCommand::ToggleFullLeaderboard);
    }

    /// Stop the worker and wait for the session to wind down.
    pub async fn shutdown(self) -> Result<(), DriverError> {
        let _ = self.commands.send(SessionCommand::Shutdown);
        self.task.await.map_err(|_| DriverError::WorkerGone)?
    }
}

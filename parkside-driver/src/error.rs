//! Driver error domain.

use thiserror::Error;

use parkside_engine::EngineError;
use parkside_stats::DecodeError;

/// Fatal session errors. Everything here unwinds to the coordinator and ends
/// the session; transient conditions (stale snapshots, empty chunks) are
/// handled inline and never surface as errors.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Engine counters no longer match the metadata it reported at
    /// initialization. Protocol violation; never retried.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to spawn execution thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The execution thread or coordinator task went away mid-session.
    #[error("execution context terminated unexpectedly")]
    WorkerGone,
}

//! # Parkside Driver
//!
//! The control plane between a long-running simulation engine and its
//! display surface. The engine is an opaque stepper; this crate decides when
//! it runs, how much it runs, and which of its results are still worth
//! showing.
//!
//! ## Architecture
//!
//! Two contexts, bridged by channels:
//!
//! - [`scheduler::ExecutionScheduler`] owns the engine handle on a dedicated
//!   thread and advances it in time-budgeted slots of bounded chunks.
//! - [`coordinator::Coordinator`] runs as an async task, translating user
//!   commands into scheduler commands and filtering results by generation so
//!   a reinitialization never mixes old counters into a fresh session.
//!
//! [`session::DriverSession`] wires both up and is the public entry point.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod coordinator;
pub mod display;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod session;

pub use coordinator::{Coordinator, DriverState, SessionCommand};
pub use display::{DisplaySink, DisplayUpdate, LeaderboardRow, SubRow};
pub use error::DriverError;
pub use protocol::{Generation, WorkerCommand, WorkerEvent};
pub use scheduler::ExecutionScheduler;
pub use session::{DriverSession, SessionOptions};

//! # Parkside Telemetry
//!
//! Structured logging and driver metrics.
//!
//! ### Components:
//! - `logging/`: tracing-subscriber initialization with env filtering
//! - `metrics/`: Prometheus registry for driver progress counters

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;

//! Prometheus registry for driver progress counters.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    /// Completed engine chunks republished to the display layer.
    pub chunks_completed: prometheus::Counter,
    /// Simulated ticks reported by the engine.
    pub ticks_total: prometheus::Counter,
    /// Snapshots dropped because their generation was superseded.
    pub stale_snapshots: prometheus::Counter,
    /// Wall-clock duration of one scheduling slot, in seconds.
    pub slot_duration: prometheus::Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let chunks_completed =
            Counter::new("parkside_chunks_total", "Completed engine chunks").unwrap();
        let ticks_total =
            Counter::new("parkside_ticks_total", "Simulated ticks reported").unwrap();
        let stale_snapshots = Counter::new(
            "parkside_stale_snapshots_total",
            "Snapshots dropped as stale",
        )
        .unwrap();

        let slot_duration = Histogram::with_opts(
            HistogramOpts::new("parkside_slot_duration_seconds", "Scheduling slot duration")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )
        .unwrap();

        registry.register(Box::new(chunks_completed.clone())).unwrap();
        registry.register(Box::new(ticks_total.clone())).unwrap();
        registry.register(Box::new(stale_snapshots.clone())).unwrap();
        registry.register(Box::new(slot_duration.clone())).unwrap();

        Self {
            registry,
            chunks_completed,
            ticks_total,
            stale_snapshots,
            slot_duration,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}

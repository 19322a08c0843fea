use once_cell::sync::Lazy;
use prometheus::{
    Histogram, IntCounterVec, exponential_buckets, register_histogram, register_int_counter_vec,
};

/// Runtime metrics of the exporter itself.
///
/// Purpose:
/// - Count probes per outcome (success or failure kind)
/// - Track how long device fetches take
///
/// Design:
/// - Registered once in the default registry, served on `/metrics`
/// - Never part of a `/probe` response
pub struct ExporterMetrics {
    pub probes: IntCounterVec,
    pub probe_duration: Histogram,
}

impl ExporterMetrics {
    fn register() -> prometheus::Result<Self> {
        Ok(Self {
            probes: register_int_counter_vec!(
                "shelly_exporter_probes_total",
                "Probes handled, by outcome.",
                &["outcome"]
            )?,
            probe_duration: register_histogram!(
                "shelly_exporter_probe_duration_seconds",
                "Time spent fetching and decoding device status.",
                exponential_buckets(0.005, 2.0, 10)?
            )?,
        })
    }

    pub fn observe(&self, outcome: &str, seconds: f64) {
        self.probes.with_label_values(&[outcome]).inc();
        self.probe_duration.observe(seconds);
    }
}

/// Global metrics registry (singleton)
///
/// PANIC:
/// - Panics on first use if the names collide in the default registry,
///   which only happens if registered twice from another path.
pub static METRICS: Lazy<ExporterMetrics> =
    Lazy::new(|| ExporterMetrics::register().expect("failed to register exporter metrics"));

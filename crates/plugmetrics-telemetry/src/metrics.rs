//! Prometheus metrics about the reporter itself
//!
//! Counts submission attempts and collected/dropped fragments so that an
//! embedding host can see whether the active sender is healthy. These
//! numbers never go into the submitted snapshot.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Metrics registry owned by one reporter instance.
pub struct ReporterMetrics {
    registry: Registry,
    /// Counter: submission attempts by status (success, failure)
    pub submissions_total: IntCounterVec,
    /// Counter: fragments by result (collected, dropped)
    pub fragments_total: IntCounterVec,
    /// Gauge: data sources registered with this instance
    pub registered_instances: IntGauge,
}

impl ReporterMetrics {
    /// Creates a new `ReporterMetrics` with all metrics registered.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new_custom(Some("plugmetrics".to_string()), None)?;

        let submissions_total = IntCounterVec::new(
            Opts::new("submissions_total", "Snapshot submission attempts"),
            &["status"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let fragments_total = IntCounterVec::new(
            Opts::new("fragments_total", "Plugin fragments by collection result"),
            &["result"],
        )?;
        registry.register(Box::new(fragments_total.clone()))?;

        let registered_instances = IntGauge::with_opts(Opts::new(
            "registered_instances",
            "Reporter instances registered as data sources",
        ))?;
        registry.register(Box::new(registered_instances.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            fragments_total,
            registered_instances,
        })
    }

    // ========================================================================
    // Recording helpers
    // ========================================================================

    /// Record the outcome of one submission attempt.
    pub fn record_submission(&self, success: bool) {
        let status = if success { "success" } else { "failure" };
        self.submissions_total.with_label_values(&[status]).inc();
    }

    /// Record fragment collection results for one cycle.
    pub fn record_fragments(&self, collected: usize, dropped: usize) {
        self.fragments_total
            .with_label_values(&["collected"])
            .inc_by(collected as u64);
        self.fragments_total
            .with_label_values(&["dropped"])
            .inc_by(dropped as u64);
    }

    /// Set the number of registered data sources.
    pub fn set_registered_instances(&self, count: usize) {
        self.registered_instances
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Current value of `submissions_total{status}`.
    pub fn submissions(&self, success: bool) -> u64 {
        let status = if success { "success" } else { "failure" };
        self.submissions_total.with_label_values(&[status]).get()
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for ReporterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterMetrics")
            .field("submissions_ok", &self.submissions(true))
            .field("submissions_failed", &self.submissions(false))
            .field("registered_instances", &self.registered_instances.get())
            .finish()
    }
}

//! Reporter instance and its one-shot initialization
//!
//! Each plugin embeds one [`MetricsReporter`]. On start it:
//!
//! 1. loads (or creates) the shared config, stopping as `Disabled` if the
//!    file is unreadable or reporting is switched off;
//! 2. publishes itself in the [`LinkTable`] under its implementation id;
//! 3. runs the election against the leader marker;
//! 4. as a follower, registers with the leader and goes idle; as the
//!    leader, registers itself as a data source and schedules
//!    [`MetricsReporter::submit_now`] on the host scheduler.
//!
//! Nothing in here returns an error to the host. Failures end up as a
//! state, a dropped fragment or a skipped cycle, and are logged only when
//! `logFailedRequests` is set.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use plugmetrics_core::config::{ReporterConfig, ReporterPaths};
use plugmetrics_core::domain::{PluginDataFragment, ReporterError, ReporterState, Snapshot};
use plugmetrics_core::ports::{
    IPluginHost, IReporterLink, ISnapshotSink, ITaskScheduler, ScheduledTask,
};
use tracing::{debug, info, warn};

use crate::election::{elect, ElectionOutcome, LeaderMarker};
use crate::link_table::LinkTable;
use crate::metrics::ReporterMetrics;
use crate::registry::InstanceRegistry;
use crate::scheduler::{INITIAL_DELAY, SUBMIT_PERIOD};
use crate::snapshot_builder::SnapshotBuilder;
use crate::transport::SubmitClient;

/// Suffix appended to the plugin name to form the default implementation id
pub const IMPLEMENTATION_SUFFIX: &str = "plugmetrics";

// ============================================================================
// ReporterBuilder
// ============================================================================

/// Configures and starts a [`MetricsReporter`]
pub struct ReporterBuilder {
    host: Arc<dyn IPluginHost>,
    scheduler: Arc<dyn ITaskScheduler>,
    links: Option<Arc<LinkTable>>,
    sink: Option<Arc<dyn ISnapshotSink>>,
    paths: Option<ReporterPaths>,
    implementation_id: Option<String>,
    initial_delay: Duration,
    period: Duration,
}

impl ReporterBuilder {
    /// Uses `links` instead of [`LinkTable::process_wide`].
    pub fn link_table(mut self, links: Arc<LinkTable>) -> Self {
        self.links = Some(links);
        self
    }

    /// Delivers snapshots to `sink` instead of the collector.
    pub fn sink(mut self, sink: Arc<dyn ISnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Uses explicit config/marker locations instead of deriving them from
    /// the host's data folder.
    pub fn paths(mut self, paths: ReporterPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Overrides the identifier this instance is published under.
    pub fn implementation_id(mut self, implementation_id: impl Into<String>) -> Self {
        self.implementation_id = Some(implementation_id.into());
        self
    }

    /// Overrides [`INITIAL_DELAY`] and [`SUBMIT_PERIOD`].
    pub fn schedule(mut self, initial_delay: Duration, period: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.period = period;
        self
    }

    /// Builds the reporter and runs its initialization.
    ///
    /// Never fails; inspect [`MetricsReporter::state`] for the outcome.
    pub fn start(self) -> Arc<MetricsReporter> {
        let implementation_id = self.implementation_id.unwrap_or_else(|| {
            self.host
                .descriptor()
                .map(|d| format!("{}/{}", d.name, IMPLEMENTATION_SUFFIX))
                .unwrap_or_else(|_| IMPLEMENTATION_SUFFIX.to_string())
        });
        let paths = self
            .paths
            .unwrap_or_else(|| ReporterPaths::from_data_folder(&self.host.data_folder()));
        let metrics = match ReporterMetrics::new() {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                debug!(error = %e, "Reporter metrics unavailable");
                None
            }
        };

        let reporter = Arc::new(MetricsReporter {
            implementation_id,
            host: self.host,
            scheduler: self.scheduler,
            links: self.links.unwrap_or_else(LinkTable::process_wide),
            sink: self
                .sink
                .unwrap_or_else(|| Arc::new(SubmitClient::new()) as Arc<dyn ISnapshotSink>),
            paths,
            initial_delay: self.initial_delay,
            period: self.period,
            config: OnceLock::new(),
            state: Mutex::new(ReporterState::Unconfigured),
            registry: InstanceRegistry::new(),
            metrics,
        });
        reporter.initialize();
        reporter
    }
}

// ============================================================================
// MetricsReporter
// ============================================================================

/// One reporter instance, owned by the plugin that embeds it
pub struct MetricsReporter {
    implementation_id: String,
    host: Arc<dyn IPluginHost>,
    scheduler: Arc<dyn ITaskScheduler>,
    links: Arc<LinkTable>,
    sink: Arc<dyn ISnapshotSink>,
    paths: ReporterPaths,
    initial_delay: Duration,
    period: Duration,
    config: OnceLock<ReporterConfig>,
    state: Mutex<ReporterState>,
    /// Data sources; only read while this instance is the active sender
    registry: InstanceRegistry,
    metrics: Option<ReporterMetrics>,
}

impl MetricsReporter {
    /// Starts configuring a reporter for the plugin behind `host`.
    pub fn builder(
        host: Arc<dyn IPluginHost>,
        scheduler: Arc<dyn ITaskScheduler>,
    ) -> ReporterBuilder {
        ReporterBuilder {
            host,
            scheduler,
            links: None,
            sink: None,
            paths: None,
            implementation_id: None,
            initial_delay: INITIAL_DELAY,
            period: SUBMIT_PERIOD,
        }
    }

    /// Starts a reporter with all defaults.
    pub fn start(
        host: Arc<dyn IPluginHost>,
        scheduler: Arc<dyn ITaskScheduler>,
    ) -> Arc<MetricsReporter> {
        Self::builder(host, scheduler).start()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> ReporterState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The loaded config, if loading succeeded.
    pub fn config(&self) -> Option<&ReporterConfig> {
        self.config.get()
    }

    pub fn paths(&self) -> &ReporterPaths {
        &self.paths
    }

    pub fn metrics(&self) -> Option<&ReporterMetrics> {
        self.metrics.as_ref()
    }

    /// Number of data sources registered with this instance.
    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    /// Implementation ids of registered data sources, in registration order.
    pub fn registered_ids(&self) -> Vec<String> {
        self.registry.all_registered().implementation_ids()
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    fn initialize(self: &Arc<Self>) {
        let config = match ReporterConfig::load_or_create(&self.paths.config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    implementation_id = %self.implementation_id,
                    error = %e,
                    "Failed to load plugmetrics config"
                );
                self.transition(ReporterState::Disabled);
                return;
            }
        };
        let enabled = config.enabled;
        // Set exactly once: initialize runs once per instance.
        let _ = self.config.set(config);

        if !enabled {
            self.transition(ReporterState::Disabled);
            return;
        }

        let this: Arc<dyn IReporterLink> = self.clone();
        self.links.publish(&this);

        let marker = LeaderMarker::new(&self.paths.marker_file);
        match elect(&marker, &self.links, &self.implementation_id) {
            Ok(ElectionOutcome::Follower(leader)) => {
                match leader.register_data_source(Arc::clone(&this)) {
                    Ok(()) => {
                        self.become_follower(leader.as_ref());
                        return;
                    }
                    Err(e) => self.log_failure(&e, "Failed to link to active reporter"),
                }
            }
            Ok(ElectionOutcome::Leader { claimed_marker }) => {
                debug!(
                    implementation_id = %self.implementation_id,
                    claimed_marker,
                    "Elected as active reporter"
                );
            }
            Err(e) => self.log_failure(&e, "Failed to determine active reporter"),
        }

        self.become_leader(this);
    }

    /// Hands sources that registered here while still unconfigured over to
    /// `leader`.
    fn become_follower(&self, leader: &dyn IReporterLink) {
        let pending = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if !state.can_transition_to(ReporterState::Follower) {
                return;
            }
            *state = ReporterState::Follower;
            // Registrations are refused from here on, so this list is final.
            self.registry.all_registered()
        };
        debug!(
            implementation_id = %self.implementation_id,
            leader = %leader.implementation_id(),
            forwarded = pending.len(),
            "Reporter state transition to follower"
        );

        for source in &pending {
            if let Err(e) = leader.register_data_source(Arc::clone(source)) {
                self.log_failure(&e, "Failed to forward data source to active reporter");
            }
        }
    }

    fn become_leader(self: &Arc<Self>, this: Arc<dyn IReporterLink>) {
        self.registry.register(this);
        self.record_registered();
        self.transition(ReporterState::Leader);

        let weak = Arc::downgrade(self);
        let task: ScheduledTask = Arc::new(move || -> BoxFuture<'static, ()> {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(reporter) = weak.upgrade() {
                    // Failures are logged and counted inside submit_now.
                    let _ = reporter.submit_now().await;
                }
            })
        });

        match self
            .scheduler
            .schedule_repeating(self.initial_delay, self.period, task)
        {
            Ok(()) => {
                info!(
                    implementation_id = %self.implementation_id,
                    first_submission_secs = self.initial_delay.as_secs(),
                    "plugmetrics reporter active"
                );
                self.transition(ReporterState::Submitting);
            }
            Err(e) => {
                if self.log_failures() {
                    warn!(
                        implementation_id = %self.implementation_id,
                        error = %e,
                        "Failed to schedule plugmetrics submissions"
                    );
                }
            }
        }
    }

    fn transition(&self, next: ReporterState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *state;
        if current.can_transition_to(next) {
            debug!(
                implementation_id = %self.implementation_id,
                from = %current,
                to = %next,
                "Reporter state transition"
            );
            *state = next;
        } else {
            debug!(
                implementation_id = %self.implementation_id,
                from = %current,
                to = %next,
                "Ignoring invalid reporter state transition"
            );
        }
    }

    // ========================================================================
    // Submission (active sender only)
    // ========================================================================

    /// Builds the snapshot for the current cycle without sending it.
    pub fn build_snapshot(&self) -> Result<Snapshot, ReporterError> {
        let config = self.active_config()?;
        let builder = SnapshotBuilder::new(config.server_uuid, Arc::clone(&self.host));
        let built = builder.build(&self.registry.all_registered());

        for dropped in &built.dropped {
            self.log_failure(dropped, "Dropped plugin data fragment");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_fragments(built.snapshot.plugins.len(), built.dropped.len());
        }

        Ok(built.snapshot)
    }

    /// Runs one collection + submission cycle now.
    pub async fn submit_now(&self) -> Result<(), ReporterError> {
        let snapshot = self.build_snapshot()?;
        let result = self.sink.submit(&snapshot).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_submission(result.is_ok());
        }
        match &result {
            Ok(()) => debug!(
                implementation_id = %self.implementation_id,
                plugins = snapshot.plugins.len(),
                "Submitted plugin stats"
            ),
            Err(e) => self.log_failure(e, "Could not submit plugin stats"),
        }
        result
    }

    fn active_config(&self) -> Result<&ReporterConfig, ReporterError> {
        match (self.state().is_active_sender(), self.config.get()) {
            (true, Some(config)) => Ok(config),
            _ => Err(ReporterError::link(
                self.implementation_id.clone(),
                "instance is not the active sender",
            )),
        }
    }

    // ========================================================================
    // Logging
    // ========================================================================

    fn log_failures(&self) -> bool {
        self.config
            .get()
            .is_some_and(|config| config.log_failed_requests)
    }

    fn log_failure(&self, error: &ReporterError, message: &str) {
        if self.log_failures() {
            warn!(
                implementation_id = %self.implementation_id,
                error = %error,
                "{message}"
            );
        }
    }

    fn record_registered(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_registered_instances(self.registry.len());
        }
    }
}

impl IReporterLink for MetricsReporter {
    fn implementation_id(&self) -> &str {
        &self.implementation_id
    }

    fn register_data_source(&self, source: Arc<dyn IReporterLink>) -> Result<(), ReporterError> {
        // Held across the append so a concurrent switch to follower sees it.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, ReporterState::Disabled | ReporterState::Follower) {
            return Err(ReporterError::link(
                self.implementation_id.clone(),
                "instance is not the active sender",
            ));
        }

        debug!(
            implementation_id = %self.implementation_id,
            source = %source.implementation_id(),
            "Registering data source"
        );
        self.registry.register(source);
        drop(state);
        self.record_registered();
        Ok(())
    }

    fn produce_data_fragment(&self) -> Result<PluginDataFragment, ReporterError> {
        let descriptor = self
            .host
            .descriptor()
            .map_err(|e| ReporterError::link(self.implementation_id.clone(), e.to_string()))?;
        Ok(PluginDataFragment::new(descriptor.name, descriptor.version))
    }
}

impl std::fmt::Debug for MetricsReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsReporter")
            .field("implementation_id", &self.implementation_id)
            .field("state", &self.state())
            .field("paths", &self.paths)
            .field("registered", &self.registry.len())
            .finish()
    }
}

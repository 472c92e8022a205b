//! CLI subcommands
//!
//! Every command works on a plugins directory: each simulated plugin gets a
//! data folder inside it, and the shared reporter directory sits next to
//! them, exactly as it would under a real host.

pub mod config;
pub mod run;
pub mod snapshot;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use plugmetrics_core::domain::ReporterState;
use plugmetrics_core::ports::{
    HostEnvironment, IReporterLink, ISnapshotSink, ITaskScheduler, PluginDescriptor,
    StaticPluginHost,
};
use plugmetrics_telemetry::{LinkTable, MetricsReporter};

/// `NAME:VERSION` as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginArg {
    pub name: String,
    pub version: String,
}

impl FromStr for PluginArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((name, version)) = s.split_once(':') else {
            bail!("expected NAME:VERSION, got '{s}'");
        };
        if name.is_empty() || version.is_empty() {
            bail!("plugin name and version must not be empty in '{s}'");
        }
        if name.contains(['/', '\\']) {
            bail!("plugin name must not contain path separators: '{name}'");
        }
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

/// Simulated plugins sharing one process-local link table
pub struct SimulatedPlugins {
    links: Arc<LinkTable>,
    pub reporters: Vec<Arc<MetricsReporter>>,
}

impl SimulatedPlugins {
    /// Loads one reporter per plugin, in command-line order.
    pub fn start(
        plugins_dir: &Path,
        plugins: &[PluginArg],
        environment: &HostEnvironment,
        scheduler: Arc<dyn ITaskScheduler>,
        sink: Arc<dyn ISnapshotSink>,
        schedule: Option<(std::time::Duration, std::time::Duration)>,
    ) -> Self {
        let links = Arc::new(LinkTable::new());
        let mut reporters = Vec::with_capacity(plugins.len());

        for plugin in plugins {
            let host = Arc::new(
                StaticPluginHost::new(
                    PluginDescriptor::new(&plugin.name, &plugin.version),
                    plugins_dir.join(&plugin.name),
                )
                .with_environment(environment.clone()),
            );
            let mut builder = MetricsReporter::builder(host, scheduler.clone())
                .link_table(links.clone())
                .sink(sink.clone());
            if let Some((initial_delay, period)) = schedule {
                builder = builder.schedule(initial_delay, period);
            }
            reporters.push(builder.start());
        }

        Self { links, reporters }
    }

    /// The instance that schedules submissions, if any became one.
    pub fn leader(&self) -> Option<&Arc<MetricsReporter>> {
        self.reporters.iter().find(|r| r.state().is_active_sender())
    }

    /// `(implementation id, state)` per instance.
    pub fn states(&self) -> Vec<(String, ReporterState)> {
        self.reporters
            .iter()
            .map(|r| (r.implementation_id().to_string(), r.state()))
            .collect()
    }

    /// Identifiers still resolvable through the link table, sorted.
    pub fn linked_ids(&self) -> Vec<String> {
        self.links.live_ids()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let instances: Vec<_> = self
            .states()
            .into_iter()
            .map(|(id, state)| serde_json::json!({"implementationId": id, "state": state}))
            .collect();
        serde_json::json!({
            "instances": instances,
            "linked": self.linked_ids(),
        })
    }
}

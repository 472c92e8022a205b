//! Run command - Simulate plugins submitting to a collector
//!
//! Loads one reporter per `--plugin` on a tokio scheduler and keeps them
//! running until Ctrl-C. The default cadence is the production one; the
//! delay flags shorten it for trying out a collector.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use plugmetrics_core::ports::HostEnvironment;
use plugmetrics_telemetry::{
    ReporterMetrics, SubmitClient, TokioScheduler, INITIAL_DELAY, SUBMIT_PERIOD, SUBMIT_URL,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{PluginArg, SimulatedPlugins};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Directory holding the plugin data folders
    #[arg(long)]
    dir: PathBuf,

    /// Plugin to simulate, as NAME:VERSION (repeatable)
    #[arg(long = "plugin", required = true)]
    plugins: Vec<PluginArg>,

    /// Collector URL
    #[arg(long, default_value = SUBMIT_URL)]
    endpoint: String,

    /// Seconds before the first submission
    #[arg(long, default_value_t = INITIAL_DELAY.as_secs())]
    initial_delay_secs: u64,

    /// Seconds between submissions
    #[arg(long, default_value_t = SUBMIT_PERIOD.as_secs())]
    period_secs: u64,

    /// Print the leader's Prometheus metrics on shutdown
    #[arg(long)]
    print_metrics: bool,
}

impl RunCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        if self.period_secs == 0 {
            bail!("--period-secs must be greater than zero");
        }
        let formatter = get_formatter(format);

        let shutdown = CancellationToken::new();
        let simulated = SimulatedPlugins::start(
            &self.dir,
            &self.plugins,
            &HostEnvironment {
                online_mode: true,
                host_version: format!("plugmetrics-cli {}", env!("CARGO_PKG_VERSION")),
                ..HostEnvironment::default()
            },
            Arc::new(TokioScheduler::current(shutdown.clone())?),
            Arc::new(SubmitClient::with_endpoint(&self.endpoint)),
            Some((
                Duration::from_secs(self.initial_delay_secs),
                Duration::from_secs(self.period_secs),
            )),
        );

        if format.is_json() {
            formatter.print_json(&simulated.to_json());
        } else {
            for (id, state) in simulated.states() {
                formatter.field(&id, &state.to_string());
            }
            formatter.field("linked", &simulated.linked_ids().join(", "));
        }
        if simulated.leader().is_none() {
            formatter.warn("No active reporter; nothing will be submitted");
            return Ok(());
        }

        info!(
            endpoint = %self.endpoint,
            plugins = self.plugins.len(),
            "Running simulated plugins, press Ctrl-C to stop"
        );
        tokio::signal::ctrl_c().await?;
        shutdown.cancel();

        if let Some(metrics) = self.printable_metrics(&simulated) {
            if format.is_json() {
                formatter.print_json(&serde_json::json!({
                    "submissionsSucceeded": metrics.submissions(true),
                    "submissionsFailed": metrics.submissions(false),
                    "registeredInstances": metrics.registered_instances.get(),
                }));
            } else {
                for line in metrics.encode()?.lines() {
                    formatter.line(line);
                }
            }
        }
        formatter.success("Stopped");
        Ok(())
    }
}

impl RunCommand {
    /// The leader's metrics, when `--print-metrics` asked for them.
    fn printable_metrics<'a>(&self, simulated: &'a SimulatedPlugins) -> Option<&'a ReporterMetrics> {
        if !self.print_metrics {
            return None;
        }
        simulated.leader().and_then(|leader| leader.metrics())
    }
}

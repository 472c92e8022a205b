//! Snapshot command - Print what the active sender would submit
//!
//! Loads one simulated reporter per `--plugin`, lets them elect a leader
//! and prints the leader's snapshot. Nothing is sent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use plugmetrics_core::ports::HostEnvironment;
use plugmetrics_telemetry::{SubmitClient, TokioScheduler};
use tokio_util::sync::CancellationToken;

use super::{PluginArg, SimulatedPlugins};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct SnapshotCommand {
    /// Directory holding the plugin data folders
    #[arg(long)]
    dir: PathBuf,

    /// Plugin to simulate, as NAME:VERSION (repeatable)
    #[arg(long = "plugin", required = true)]
    plugins: Vec<PluginArg>,

    /// Online player count reported by the host
    #[arg(long, default_value_t = 0)]
    players: u32,

    /// Number of managed servers reported by the host
    #[arg(long, default_value_t = 0)]
    servers: u32,

    /// Report the host as running in offline mode
    #[arg(long)]
    offline: bool,
}

impl SnapshotCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let environment = HostEnvironment {
            online_players: self.players,
            managed_servers: self.servers,
            online_mode: !self.offline,
            host_version: format!("plugmetrics-cli {}", env!("CARGO_PKG_VERSION")),
            runtime_version: "n/a".to_string(),
        };

        // Nothing is scheduled past this command: the token is cancelled on return.
        let shutdown = CancellationToken::new();
        let _guard = shutdown.clone().drop_guard();
        let simulated = SimulatedPlugins::start(
            &self.dir,
            &self.plugins,
            &environment,
            Arc::new(TokioScheduler::current(shutdown)?),
            Arc::new(SubmitClient::new()),
            None,
        );

        let Some(leader) = simulated.leader() else {
            formatter.warn("No active reporter; reporting is disabled or the config is unreadable");
            return Ok(());
        };
        let snapshot = leader
            .build_snapshot()
            .context("Failed to build snapshot")?;
        let json = serde_json::to_value(&snapshot).context("Failed to serialize snapshot")?;

        if format.is_json() {
            formatter.print_json(&json);
            return Ok(());
        }

        for (id, state) in simulated.states() {
            formatter.field(&id, &state.to_string());
        }
        formatter.success(&format!(
            "Snapshot with {} plugin(s)",
            snapshot.plugins.len()
        ));
        let pretty = serde_json::to_string_pretty(&json)?;
        for line in pretty.lines() {
            formatter.line(line);
        }
        Ok(())
    }
}

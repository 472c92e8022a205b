//! Config command - View the shared reporter configuration
//!
//! `plugmetrics config show --dir <plugins dir>` loads the config the
//! reporters in that directory would use, creating it on first use just as
//! a starting reporter does.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use plugmetrics_core::config::{ReporterConfig, ReporterPaths, REPORTER_DIR_NAME};
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the shared configuration, creating it if missing
    Show {
        /// Directory holding the plugin data folders
        #[arg(long)]
        dir: PathBuf,
    },
}

impl ConfigCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show { dir } => execute_show(dir, format),
        }
    }
}

fn execute_show(dir: &std::path::Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let paths = ReporterPaths::new(dir.join(REPORTER_DIR_NAME));
    let existed = paths.config_file.exists();

    let config = ReporterConfig::load_or_create(&paths.config_file)
        .with_context(|| format!("Failed to load {}", paths.config_file.display()))?;

    info!(config_path = %paths.config_file.display(), created = !existed, "Showing configuration");

    if format.is_json() {
        let mut json = serde_json::to_value(&config)
            .context("Failed to serialize configuration to JSON")?;
        json["configPath"] = serde_json::json!(paths.config_file.display().to_string());
        json["created"] = serde_json::json!(!existed);
        formatter.print_json(&json);
        return Ok(());
    }

    if existed {
        formatter.success(&format!("Configuration ({})", paths.config_file.display()));
    } else {
        formatter.success(&format!("Created {}", paths.config_file.display()));
    }
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
    for line in yaml.lines() {
        formatter.line(line);
    }
    if !config.enabled {
        formatter.warn("Reporting is disabled; no reporter will submit data");
    }
    Ok(())
}

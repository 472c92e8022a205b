//! Configuration module for plugmetrics.
//!
//! Every reporter instance in the process reads the same small YAML file,
//! which lives next to the leader marker in a directory shared by all
//! plugins. The file is created with explanatory comments on first run and
//! never rewritten afterwards, so hand edits survive restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ReporterError;

/// Name of the directory shared by every embedded reporter.
pub const REPORTER_DIR_NAME: &str = "plugmetrics";

/// Name of the YAML configuration file inside [`REPORTER_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Name of the leader marker file inside [`REPORTER_DIR_NAME`].
pub const MARKER_FILE_NAME: &str = "leader.txt";

/// Comment block written above the keys of a freshly created config file.
const CONFIG_HEADER: &[&str] = &[
    "# plugmetrics collects some data for plugin authors like how many servers are using their plugins.",
    "# To honor their work, you should not disable it.",
    "# This has nearly no effect on the server performance!",
];

// ---------------------------------------------------------------------------
// ReporterConfig
// ---------------------------------------------------------------------------

/// Persisted reporter settings, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterConfig {
    /// Whether this server may send data at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Anonymous installation identifier, generated once.
    pub server_uuid: Uuid,
    /// Whether failed submissions and link errors are logged.
    #[serde(default)]
    pub log_failed_requests: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ReporterConfig {
    /// Settings for a first run: enabled, quiet, with a fresh identifier.
    fn default() -> Self {
        Self {
            enabled: true,
            server_uuid: Uuid::new_v4(),
            log_failed_requests: false,
        }
    }
}

impl ReporterConfig {
    /// Load configuration from the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ReporterError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReporterError::config_load(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| ReporterError::config_load(path, e))
    }

    /// Load the file at `path`, creating it with [`ReporterConfig::default`]
    /// values first if it does not exist yet.
    ///
    /// An existing file is never rewritten.
    pub fn load_or_create(path: &Path) -> Result<Self, ReporterError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ReporterError::config_load(path, e))?;
            }
            std::fs::write(path, Self::default().render())
                .map_err(|e| ReporterError::config_load(path, e))?;
        }
        Self::load(path)
    }

    /// Render the commented file body for these settings.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in CONFIG_HEADER {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("enabled: {}\n", self.enabled));
        out.push_str(&format!("serverUuid: \"{}\"\n", self.server_uuid));
        out.push_str(&format!("logFailedRequests: {}\n", self.log_failed_requests));
        out
    }
}

// ---------------------------------------------------------------------------
// ReporterPaths
// ---------------------------------------------------------------------------

/// Locations of the shared config file and leader marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterPaths {
    /// Shared reporter directory.
    pub dir: PathBuf,
    /// `config.yml` inside [`ReporterPaths::dir`].
    pub config_file: PathBuf,
    /// `leader.txt` inside [`ReporterPaths::dir`].
    pub marker_file: PathBuf,
}

impl ReporterPaths {
    /// Paths rooted at an explicit shared directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config_file: dir.join(CONFIG_FILE_NAME),
            marker_file: dir.join(MARKER_FILE_NAME),
            dir,
        }
    }

    /// Paths derived from a plugin's own data folder.
    ///
    /// The shared directory is a sibling of the data folder, so every plugin
    /// installed under the same parent resolves to the same files.
    pub fn from_data_folder(data_folder: &Path) -> Self {
        let parent = data_folder.parent().unwrap_or(data_folder);
        Self::new(parent.join(REPORTER_DIR_NAME))
    }
}

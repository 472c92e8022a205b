//! Plugin host port (driving/primary port)
//!
//! The host runtime owns the plugin descriptor, the live environment facts
//! and the data folder. The reporter only reads them.
//!
//! ## Design Notes
//!
//! - `descriptor` is fallible: once a plugin has been unloaded its host may
//!   no longer be able to describe it. The reporter treats that failure as a
//!   link error for that plugin's fragment.
//! - `environment` is infallible and cheap; it is polled once per cycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Name and version of the plugin embedding a reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Live facts about the host runtime, read on every submission cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEnvironment {
    /// Players currently online (unclamped)
    pub online_players: u32,
    /// Downstream servers managed by the host
    pub managed_servers: u32,
    /// Whether the host authenticates players
    pub online_mode: bool,
    /// Host software version string
    pub host_version: String,
    /// Version string of the language runtime executing the host
    pub runtime_version: String,
}

/// Port trait for the host plugin runtime
pub trait IPluginHost: Send + Sync {
    /// Returns the embedding plugin's descriptor
    fn descriptor(&self) -> anyhow::Result<PluginDescriptor>;

    /// Returns the current environment facts
    fn environment(&self) -> HostEnvironment;

    /// Returns the embedding plugin's own data folder
    fn data_folder(&self) -> PathBuf;
}

// ============================================================================
// StaticPluginHost
// ============================================================================

/// In-memory host for embedders that push facts instead of being polled
///
/// Also used by the CLI simulator and tests. Calling [`unload`] makes
/// `descriptor` fail from then on, mimicking a plugin removed at runtime.
///
/// [`unload`]: StaticPluginHost::unload
#[derive(Debug)]
pub struct StaticPluginHost {
    descriptor: PluginDescriptor,
    data_folder: PathBuf,
    environment: Mutex<HostEnvironment>,
    loaded: AtomicBool,
}

impl StaticPluginHost {
    pub fn new(descriptor: PluginDescriptor, data_folder: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            data_folder: data_folder.into(),
            environment: Mutex::new(HostEnvironment::default()),
            loaded: AtomicBool::new(true),
        }
    }

    /// Sets the initial environment facts
    pub fn with_environment(self, environment: HostEnvironment) -> Self {
        self.set_environment(environment);
        self
    }

    /// Replaces the environment facts reported from now on
    pub fn set_environment(&self, environment: HostEnvironment) {
        *self
            .environment
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = environment;
    }

    /// Marks the plugin as unloaded
    pub fn unload(&self) {
        self.loaded.store(false, Ordering::Release);
    }
}

impl IPluginHost for StaticPluginHost {
    fn descriptor(&self) -> anyhow::Result<PluginDescriptor> {
        if !self.loaded.load(Ordering::Acquire) {
            anyhow::bail!("plugin {} is no longer loaded", self.descriptor.name);
        }
        Ok(self.descriptor.clone())
    }

    fn environment(&self) -> HostEnvironment {
        self.environment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn data_folder(&self) -> PathBuf {
        self.data_folder.clone()
    }
}

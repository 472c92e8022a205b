//! Snapshot assembly (active sender only)
//!
//! Combines the host's live facts, the local OS facts and one fragment per
//! registered reporter instance. A fragment that cannot be produced is
//! dropped on its own; it never aborts the snapshot.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use plugmetrics_core::domain::{
    clamp_player_amount, PluginDataFragment, ReporterError, ServerData, Snapshot,
};
use plugmetrics_core::ports::{IPluginHost, IReporterLink, LINK_PROTOCOL_VERSION};
use uuid::Uuid;

use crate::os_info::OsInfo;
use crate::registry::RegisteredInstances;

/// A snapshot plus the fragments that had to be left out of it
#[derive(Debug)]
pub struct BuiltSnapshot {
    pub snapshot: Snapshot,
    /// One entry per registered instance whose fragment was dropped
    pub dropped: Vec<ReporterError>,
}

/// Builds snapshots for one installation
pub struct SnapshotBuilder {
    server_uuid: Uuid,
    host: Arc<dyn IPluginHost>,
    os_info: OsInfo,
}

impl SnapshotBuilder {
    /// Creates a builder that reads OS facts from the current machine.
    pub fn new(server_uuid: Uuid, host: Arc<dyn IPluginHost>) -> Self {
        Self {
            server_uuid,
            host,
            os_info: OsInfo::collect(),
        }
    }

    /// Replaces the collected OS facts.
    pub fn with_os_info(mut self, os_info: OsInfo) -> Self {
        self.os_info = os_info;
        self
    }

    /// Environment facts for the current cycle, player count clamped.
    pub fn server_data(&self) -> ServerData {
        let env = self.host.environment();
        ServerData {
            server_uuid: self.server_uuid,
            player_amount: clamp_player_amount(env.online_players),
            managed_servers: env.managed_servers,
            online_mode: env.online_mode,
            host_version: env.host_version,
            runtime_version: env.runtime_version,
            os_name: self.os_info.name.clone(),
            os_arch: self.os_info.arch.clone(),
            os_version: self.os_info.version.clone(),
            core_count: self.os_info.core_count,
        }
    }

    /// Builds one snapshot from the given data sources.
    pub fn build(&self, sources: &RegisteredInstances) -> BuiltSnapshot {
        let mut plugins = Vec::with_capacity(sources.len());
        let mut dropped = Vec::new();

        for source in sources {
            match produce_guarded(source) {
                Ok(fragment) => plugins.push(fragment),
                Err(e) => dropped.push(e),
            }
        }

        BuiltSnapshot {
            snapshot: Snapshot {
                server: self.server_data(),
                plugins,
            },
            dropped,
        }
    }
}

/// Asks `source` for its fragment, turning a contract mismatch or a panic
/// into a link error.
fn produce_guarded(source: &Arc<dyn IReporterLink>) -> Result<PluginDataFragment, ReporterError> {
    let version = source.protocol_version();
    if version != LINK_PROTOCOL_VERSION {
        return Err(ReporterError::link(
            source.implementation_id(),
            format!("unsupported link protocol version {version}"),
        ));
    }

    catch_unwind(AssertUnwindSafe(|| source.produce_data_fragment())).unwrap_or_else(|_| {
        Err(ReporterError::link(
            source.implementation_id(),
            "fragment producer panicked",
        ))
    })
}

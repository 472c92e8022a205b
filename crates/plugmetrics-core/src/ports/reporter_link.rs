//! Cross-instance link port
//!
//! Every reporter instance exposes this capability so that independently
//! built copies can cooperate through a shared contract only: the leader
//! accepts registrations, every instance produces its own fragment.
//!
//! ## Design Notes
//!
//! - Instances find each other by implementation identifier through a
//!   process-wide lookup table, never by type.
//! - [`LINK_PROTOCOL_VERSION`] is bumped whenever the call contract changes;
//!   instances refuse to link across versions.

use std::sync::Arc;

use crate::domain::{PluginDataFragment, ReporterError};

/// Version of the [`IReporterLink`] call contract.
pub const LINK_PROTOCOL_VERSION: u32 = 1;

/// Capability interface shared by all reporter instances in a process
pub trait IReporterLink: Send + Sync {
    /// Identifier this instance is published under
    fn implementation_id(&self) -> &str;

    /// Contract version implemented by this instance
    fn protocol_version(&self) -> u32 {
        LINK_PROTOCOL_VERSION
    }

    /// Adds `source` to this instance's data sources
    ///
    /// Called by followers on the leader. Registration is append-only.
    fn register_data_source(&self, source: Arc<dyn IReporterLink>) -> Result<(), ReporterError>;

    /// Produces this instance's per-plugin contribution
    ///
    /// Called by the leader once per submission cycle.
    fn produce_data_fragment(&self) -> Result<PluginDataFragment, ReporterError>;
}

//! Port definitions (hexagonal architecture interfaces)
//!
//! ## Ports Overview
//!
//! - [`IPluginHost`] - Descriptor lookup, live environment facts, data folder
//! - [`IReporterLink`] - Capability shared by sibling reporter instances
//! - [`ITaskScheduler`] - The host's repeating-task primitive
//! - [`ISnapshotSink`] - Delivery of a finished snapshot

pub mod host;
pub mod reporter_link;
pub mod scheduler;
pub mod snapshot_sink;

pub use host::{HostEnvironment, IPluginHost, PluginDescriptor, StaticPluginHost};
pub use reporter_link::{IReporterLink, LINK_PROTOCOL_VERSION};
pub use scheduler::{ITaskScheduler, ScheduledTask};
pub use snapshot_sink::ISnapshotSink;

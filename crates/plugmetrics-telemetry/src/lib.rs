//! plugmetrics Telemetry - Opt-in usage reporting
//!
//! Provides:
//! - `MetricsReporter`: one reporter instance per embedding plugin, with leader election
//! - `InstanceRegistry`: append-only list of data sources owned by the active sender
//! - `LinkTable`: process-wide lookup of reporter instances by implementation identifier
//! - `LeaderMarker`: the persisted name of the active sender
//! - `SnapshotBuilder`: environment facts plus aggregated plugin fragments
//! - `SubmitClient`: gzip + HTTPS POST to the collector
//! - `TokioScheduler`: repeating-task adapter for hosts running on tokio
//! - `ReporterMetrics`: Prometheus counters about the reporter itself

pub mod election;
pub mod link_table;
pub mod metrics;
pub mod os_info;
pub mod registry;
pub mod reporter;
pub mod scheduler;
pub mod snapshot_builder;
pub mod transport;

pub use election::{elect, ElectionOutcome, LeaderMarker};
pub use link_table::LinkTable;
pub use metrics::ReporterMetrics;
pub use os_info::OsInfo;
pub use registry::{InstanceRegistry, RegisteredInstances};
pub use reporter::{MetricsReporter, ReporterBuilder};
pub use scheduler::{TokioScheduler, INITIAL_DELAY, SUBMIT_PERIOD};
pub use snapshot_builder::{BuiltSnapshot, SnapshotBuilder};
pub use transport::{compress, decompress, SubmitClient, SUBMIT_URL};

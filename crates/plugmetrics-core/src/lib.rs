//! plugmetrics Core - Domain types, configuration and ports
//!
//! This crate contains the parts of the reporter that every adapter shares:
//! - **Config Store** - `ReporterConfig` and `ReporterPaths` (shared YAML file and leader marker)
//! - **Domain types** - `Snapshot`, `ServerData`, `PluginDataFragment`, `ReporterState`, `ReporterError`
//! - **Port definitions** - Traits for collaborators: `IPluginHost`, `IReporterLink`,
//!   `ITaskScheduler`, `ISnapshotSink`
//!
//! # Architecture
//!
//! The domain module has no I/O. Ports define the seams that the telemetry
//! crate and the embedding host implement: the host runtime provides
//! descriptor lookup, live facts and a scheduler; sibling reporter instances
//! talk to each other only through [`ports::IReporterLink`].

pub mod config;
pub mod domain;
pub mod ports;

//! Snapshot sink port
//!
//! Where a finished snapshot goes. The production implementation POSTs it to
//! the collector; the CLI's dry-run and tests substitute their own.

use crate::domain::{ReporterError, Snapshot};

/// Port trait for delivering one snapshot
///
/// One call is one attempt. Implementations must not retry: the next
/// scheduled cycle is the retry.
#[async_trait::async_trait]
pub trait ISnapshotSink: Send + Sync {
    async fn submit(&self, snapshot: &Snapshot) -> Result<(), ReporterError>;
}

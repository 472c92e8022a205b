//! Leader election
//!
//! Picks the single reporter instance that schedules and performs
//! submissions. The choice is persisted in a marker file so that, across
//! restarts, the same plugin's reporter keeps the role as long as it is
//! still loaded.
//!
//! ## Flow
//!
//! ```text
//! read marker ──→ names us ─────────────────────────→ Leader (marker kept)
//!      │
//!      ├──→ names a live sibling (same protocol) ───→ Follower(sibling)
//!      │
//!      └──→ absent / stale / foreign protocol ──────→ write our id → Leader
//! ```
//!
//! ## Known race
//!
//! "Read marker, then conditionally write it" is not guarded by any lock.
//! Two instances initializing at the same moment with no usable marker can
//! both claim it and both become leader, producing two independent
//! submitters until the next restart. This is accepted: it only costs a
//! duplicate submission and the next restart converges on whichever
//! identifier was written last.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plugmetrics_core::domain::ReporterError;
use plugmetrics_core::ports::{IReporterLink, LINK_PROTOCOL_VERSION};
use tracing::debug;

use crate::link_table::LinkTable;

// ============================================================================
// LeaderMarker
// ============================================================================

/// The persisted identifier of the active sender
#[derive(Debug, Clone)]
pub struct LeaderMarker {
    path: PathBuf,
}

impl LeaderMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the first line of the marker file.
    ///
    /// Returns `Ok(None)` if the file does not exist or its first line is blank.
    pub fn read(&self) -> Result<Option<String>, ReporterError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ReporterError::config_load(&self.path, e)),
        };

        Ok(content
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from))
    }

    /// Overwrites the marker with `implementation_id`.
    pub fn write(&self, implementation_id: &str) -> Result<(), ReporterError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReporterError::config_load(&self.path, e))?;
        }
        std::fs::write(&self.path, format!("{implementation_id}\n"))
            .map_err(|e| ReporterError::config_load(&self.path, e))
    }
}

// ============================================================================
// Election
// ============================================================================

/// Result of [`elect`]
pub enum ElectionOutcome {
    /// This instance is the active sender.
    Leader {
        /// `true` if the marker had to be (re)written for this instance
        claimed_marker: bool,
    },
    /// Another live instance is the active sender.
    Follower(Arc<dyn IReporterLink>),
}

impl std::fmt::Debug for ElectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectionOutcome::Leader { claimed_marker } => f
                .debug_struct("Leader")
                .field("claimed_marker", claimed_marker)
                .finish(),
            ElectionOutcome::Follower(leader) => f
                .debug_tuple("Follower")
                .field(&leader.implementation_id())
                .finish(),
        }
    }
}

/// Decides whether `own_id` leads or follows.
///
/// An I/O failure on the marker is returned to the caller, which falls back
/// to leading.
pub fn elect(
    marker: &LeaderMarker,
    links: &LinkTable,
    own_id: &str,
) -> Result<ElectionOutcome, ReporterError> {
    match marker.read()? {
        Some(named) if named == own_id => {
            debug!(implementation_id = %own_id, "Marker already names this reporter");
            return Ok(ElectionOutcome::Leader {
                claimed_marker: false,
            });
        }
        Some(named) => match links.resolve(&named) {
            Some(leader) if leader.protocol_version() == LINK_PROTOCOL_VERSION => {
                debug!(leader = %named, implementation_id = %own_id, "Following active reporter");
                return Ok(ElectionOutcome::Follower(leader));
            }
            Some(leader) => {
                debug!(
                    leader = %named,
                    protocol = leader.protocol_version(),
                    "Marked reporter speaks another link protocol, claiming marker"
                );
            }
            None => {
                debug!(leader = %named, "Marked reporter is not loaded, claiming marker");
            }
        },
        None => {
            debug!(implementation_id = %own_id, "No leader marker, claiming it");
        }
    }

    marker.write(own_id)?;
    Ok(ElectionOutcome::Leader {
        claimed_marker: true,
    })
}

//! Per-instance lifecycle state
//!
//! ```text
//! Unconfigured ──→ Disabled                (config off or unreadable)
//!      │
//!      ├──────────→ Follower               (registered with the leader)
//!      │
//!      └──────────→ Leader ──→ Submitting  (repeating tick scheduled)
//! ```
//!
//! Transitions happen once, during initialization. No instance changes
//! state afterwards.

use serde::Serialize;

/// Lifecycle state of one reporter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterState {
    /// Initialization has not finished
    #[default]
    Unconfigured,
    /// Config disabled reporting, or could not be loaded
    Disabled,
    /// Contributes a fragment to another instance's submissions
    Follower,
    /// Elected as active sender; submissions not scheduled yet
    Leader,
    /// Active sender with a repeating submission tick
    Submitting,
}

impl ReporterState {
    /// Whether this instance performs network submissions.
    pub fn is_active_sender(&self) -> bool {
        matches!(self, ReporterState::Leader | ReporterState::Submitting)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: ReporterState) -> bool {
        use ReporterState::*;
        matches!(
            (*self, next),
            (Unconfigured, Disabled)
                | (Unconfigured, Follower)
                | (Unconfigured, Leader)
                | (Leader, Submitting)
        )
    }
}

impl std::fmt::Display for ReporterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReporterState::Unconfigured => "unconfigured",
            ReporterState::Disabled => "disabled",
            ReporterState::Follower => "follower",
            ReporterState::Leader => "leader",
            ReporterState::Submitting => "submitting",
        };
        write!(f, "{}", s)
    }
}

//! Domain types
//!
//! - Snapshot payload types and the player-count clamp
//! - Reporter lifecycle state
//! - Reporter error taxonomy

pub mod errors;
pub mod snapshot;
pub mod state;

pub use errors::ReporterError;
pub use snapshot::{
    clamp_player_amount, PluginDataFragment, ServerData, Snapshot, MAX_REPORTED_PLAYERS,
};
pub use state::ReporterState;

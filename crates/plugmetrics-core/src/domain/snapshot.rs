//! Snapshot payload types
//!
//! A [`Snapshot`] is built fresh on every submission cycle and dropped once
//! the request completes. Field names on the wire follow the collector's
//! schema, which is why several Rust fields carry an explicit rename.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ReporterError;

/// Online player counts above this value are reported as this value.
pub const MAX_REPORTED_PLAYERS: u32 = 500;

/// Clamp a live player count to [`MAX_REPORTED_PLAYERS`].
pub fn clamp_player_amount(online_players: u32) -> u32 {
    online_players.min(MAX_REPORTED_PLAYERS)
}

// ============================================================================
// PluginDataFragment
// ============================================================================

/// Per-plugin contribution to a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDataFragment {
    pub plugin_name: String,
    pub plugin_version: String,
    /// Chart payloads; always present, possibly empty.
    #[serde(default)]
    pub custom_charts: Vec<serde_json::Value>,
}

impl PluginDataFragment {
    /// Creates a fragment with no custom charts
    pub fn new(plugin_name: impl Into<String>, plugin_version: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            plugin_version: plugin_version.into(),
            custom_charts: Vec::new(),
        }
    }
}

// ============================================================================
// ServerData
// ============================================================================

/// Environment facts describing the host and the machine it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerData {
    #[serde(rename = "serverUUID")]
    pub server_uuid: Uuid,
    /// Already clamped, see [`clamp_player_amount`].
    pub player_amount: u32,
    pub managed_servers: u32,
    #[serde(with = "flag_as_int")]
    pub online_mode: bool,
    #[serde(rename = "bungeecordVersion")]
    pub host_version: String,
    #[serde(rename = "javaVersion")]
    pub runtime_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub os_version: String,
    pub core_count: u32,
}

/// The collector expects booleans as `1` / `0`.
mod flag_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// The full payload sent in one submission cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub server: ServerData,
    pub plugins: Vec<PluginDataFragment>,
}

impl Snapshot {
    /// Compact JSON encoding used on the wire.
    pub fn to_json(&self) -> Result<String, ReporterError> {
        Ok(serde_json::to_string(self)?)
    }
}

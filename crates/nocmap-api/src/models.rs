// Wire types for the NOC server.
//
// These mirror the JSON the server actually sends. Fields whose shape
// varies between server deployments (ids, positions, status) are kept
// loose here and normalised by `nocmap-core`'s conversion layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Dashboard API ────────────────────────────────────────────────────

/// Static floor/type configuration from `GET /api/config`.
///
/// Map order is the server's key order and is preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub floor_maps: IndexMap<String, String>,
    pub floor_labels: IndexMap<String, String>,
    pub device_types: IndexMap<String, DeviceTypeLabel>,
}

/// Display metadata for one device type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceTypeLabel {
    pub label: String,
}

/// `GET /api/status` body, and the payload of the `update_data` push event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub devices: Vec<ApiDevice>,
    #[serde(default)]
    pub global: Option<ApiGlobal>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Only present on push payloads.
    #[serde(default)]
    pub logs: Option<Vec<ApiLogEntry>>,
    /// `"ok"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A device row in a status payload.
///
/// `id` is a string in config-driven deployments and an integer in
/// database-backed ones. Positions come either nested under `position`
/// (`{"top": "64.3%", "left": "64.8%"}`) or flat as `pos_top`/`pos_left`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDevice {
    pub id: serde_json::Value,
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub floor_id: String,
    #[serde(default)]
    pub position: Option<ApiPosition>,
    #[serde(default)]
    pub pos_top: Option<serde_json::Value>,
    #[serde(default)]
    pub pos_left: Option<serde_json::Value>,
    /// Tri-state status: `"online"`, `"offline"`, `"unstable"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Legacy boolean status.
    #[serde(default)]
    pub online: Option<bool>,
}

/// Nested position: each axis is a number or a CSS percentage string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPosition {
    pub top: serde_json::Value,
    pub left: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiGlobal {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub offline: u32,
}

/// One status-change event. Server timestamps are `%Y-%m-%d %H:%M:%S`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiLogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<ApiLogEntry>,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub devices_tracked: u64,
    #[serde(default)]
    pub devices_with_status: u64,
}

// ── Admin API ────────────────────────────────────────────────────────

/// A row of `GET /admin/api/devices`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminDevice {
    pub id: i64,
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub floor_id: String,
    pub pos_top: f64,
    pub pos_left: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request body for creating or updating a device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceDraft {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub floor_id: String,
    pub pos_top: f64,
    pub pos_left: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl From<&AdminDevice> for DeviceDraft {
    fn from(d: &AdminDevice) -> Self {
        Self {
            name: d.name.clone(),
            ip: d.ip.clone(),
            device_type: d.device_type.clone(),
            floor_id: d.floor_id.clone(),
            pos_top: d.pos_top,
            pos_left: d.pos_left,
            is_active: d.is_active,
        }
    }
}

/// `{ message, id? }` returned by admin writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

/// `{ "error": "..." }` body carried by non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

fn default_active() -> bool {
    true
}

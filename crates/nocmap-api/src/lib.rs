// nocmap-api: Async Rust client for the NOC monitoring server
//
// Three API surfaces share one transport:
// - the public dashboard API (`/api/config`, `/api/status`, `/api/logs`, `/api/health`)
// - the session-authenticated admin API (`/admin/api/devices`)
// - the Socket.IO push channel that delivers `update_data` snapshots

pub mod admin;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod push;
pub mod socketio;
pub mod transport;

pub use client::NocClient;
pub use error::Error;
pub use models::{
    AdminDevice, ApiConfig, ApiDevice, ApiGlobal, ApiLogEntry, ApiPosition, ApiStatus,
    DeviceDraft, DeviceTypeLabel, HealthResponse, MutationResponse,
};
pub use push::{PushEvent, PushHandle, ReconnectConfig};
pub use transport::{TlsMode, TransportConfig};

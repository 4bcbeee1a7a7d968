// nocmap-core: Floor-map domain model and reactive data layer between
// nocmap-api and consumers (CLI/TUI).

pub mod admin;
pub mod aggregate;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod picker;
pub mod render;
pub mod store;
pub mod stream;
pub mod summary;
pub mod viewport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, Credentials, TlsVerification};
pub use controller::{CONFIG_RETRY_DELAY, ConnectionState, Controller};
pub use dashboard::{DashboardState, ViewMode};
pub use error::CoreError;
pub use store::DataStore;
pub use stream::SnapshotStream;
pub use viewport::{Point, ViewportTransform, ZoomDirection, ZoomLimits};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AdminDevice, Device, DeviceDraft, DeviceId, DeviceStatus, DeviceTypeInfo, Floor, GlobalStats,
    LOG_CAPACITY, LOG_DISPLAY_COUNT, LogEntry, LogLevel, Percent, Position, SiteConfig,
    StatusSnapshot,
};

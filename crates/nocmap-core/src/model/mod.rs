// ── Domain model ──
//
// Canonical representation of what the NOC server reports. Wire-level
// variations (string vs integer ids, numeric vs "64.3%" positions,
// boolean vs tri-state status) are normalised in `convert.rs` so every
// consumer sees one shape.

pub mod device;
pub mod log;
pub mod site;
pub mod snapshot;

pub use device::{Device, DeviceId, DeviceStatus, Percent, Position};
pub use log::{LOG_CAPACITY, LOG_DISPLAY_COUNT, LogBuffer, LogEntry, LogLevel};
pub use site::{DeviceTypeInfo, Floor, SiteConfig};
pub use snapshot::{GlobalStats, StatusSnapshot};

// Admin rows and write bodies are used as-is from the wire layer.
pub use nocmap_api::{AdminDevice, DeviceDraft, HealthResponse};

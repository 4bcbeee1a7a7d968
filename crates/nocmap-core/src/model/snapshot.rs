// ── Status snapshot ──

use serde::{Deserialize, Serialize};

use super::device::Device;
use super::log::LogEntry;

/// Building-wide counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total: u32,
    pub online: u32,
    /// Everything that is not online, unstable included.
    pub offline: u32,
}

impl GlobalStats {
    /// Recompute from the device list.
    pub fn from_devices<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Self {
        devices.into_iter().fold(Self::default(), |mut acc, d| {
            acc.total += 1;
            if d.is_online() {
                acc.online += 1;
            } else {
                acc.offline += 1;
            }
            acc
        })
    }
}

/// Everything the server pushes per update. Replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub devices: Vec<Device>,
    pub global: GlobalStats,
    /// Server-side time of the snapshot, as sent.
    pub timestamp: Option<String>,
    /// Newest first, at most `LOG_CAPACITY`.
    pub logs: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, DeviceStatus, Position};

    #[test]
    fn global_stats_count_unstable_as_offline() {
        let devices: Vec<Device> = [
            DeviceStatus::Online,
            DeviceStatus::Offline,
            DeviceStatus::Unstable,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, status)| Device {
            id: DeviceId::new(i.to_string()),
            name: format!("d{i}"),
            ip: String::new(),
            device_type: "switch".into(),
            floor_id: "ground".into(),
            position: Position::default(),
            status,
        })
        .collect();

        assert_eq!(
            GlobalStats::from_devices(&devices),
            GlobalStats {
                total: 3,
                online: 1,
                offline: 2
            }
        );
    }
}

// ── Aggregate device lists ──
//
// Backs the "total / online / offline" drill-down: every device matching a
// status bucket, optionally narrowed to one type, offline devices first.

use std::cmp::Ordering;

use strum::{Display, EnumIter};

use crate::model::Device;

/// Which slice of the building-wide counts was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StatusBucket {
    Total,
    Online,
    Offline,
}

impl StatusBucket {
    pub fn contains(self, device: &Device) -> bool {
        match self {
            Self::Total => true,
            Self::Online => device.is_online(),
            Self::Offline => !device.is_online(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Total => "All Devices",
            Self::Online => "Online Devices",
            Self::Offline => "Offline Devices",
        }
    }
}

/// Offline (anything not online) before online, then name A→Z ignoring case.
pub fn compare_devices(a: &Device, b: &Device) -> Ordering {
    a.is_online()
        .cmp(&b.is_online())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Devices in `bucket`, narrowed to `type_filter` when given, sorted with
/// [`compare_devices`]. The sort is stable.
pub fn device_list<'a>(
    devices: &'a [Device],
    bucket: StatusBucket,
    type_filter: Option<&str>,
) -> Vec<&'a Device> {
    let mut list: Vec<&Device> = devices
        .iter()
        .filter(|d| bucket.contains(d))
        .filter(|d| type_filter.is_none_or(|t| d.device_type == t))
        .collect();
    list.sort_by(|a, b| compare_devices(a, b));
    list
}

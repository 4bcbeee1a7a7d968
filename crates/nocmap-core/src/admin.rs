// ── Admin table filtering ──

use std::collections::BTreeSet;

use crate::model::AdminDevice;

/// Search box plus the two dropdowns of the admin device table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminQuery {
    /// Lowercased, then matched as a substring of the lowercased name or of
    /// the IP. Empty matches everything.
    pub search: String,
    pub floor: Option<String>,
    pub device_type: Option<String>,
}

impl AdminQuery {
    pub fn matches(&self, device: &AdminDevice) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = device.name.to_lowercase().contains(&term) || device.ip.contains(&term);
        let matches_floor = self.floor.as_deref().is_none_or(|f| device.floor_id == f);
        let matches_type = self
            .device_type
            .as_deref()
            .is_none_or(|t| device.device_type == t);
        matches_search && matches_floor && matches_type
    }
}

/// Rows matching `query`, in input order.
pub fn filter_admin_devices<'a>(devices: &'a [AdminDevice], query: &AdminQuery) -> Vec<&'a AdminDevice> {
    devices.iter().filter(|d| query.matches(d)).collect()
}

/// Sorted, de-duplicated floor ids for the floor dropdown.
pub fn distinct_floors(devices: &[AdminDevice]) -> Vec<String> {
    devices
        .iter()
        .map(|d| d.floor_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated type ids for the type dropdown.
pub fn distinct_types(devices: &[AdminDevice]) -> Vec<String> {
    devices
        .iter()
        .map(|d| d.device_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

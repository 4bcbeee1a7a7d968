// ── API → domain conversions ──
//
// Unknown status strings fall back to the legacy boolean; unparsable
// positions fall back to the origin.

use indexmap::IndexMap;
use tracing::debug;

use nocmap_api::{ApiConfig, ApiDevice, ApiLogEntry, ApiStatus};

use crate::model::{
    Device, DeviceId, DeviceStatus, DeviceTypeInfo, Floor, GlobalStats, LogBuffer, LogEntry,
    Percent, Position, SiteConfig, StatusSnapshot,
};

impl From<ApiConfig> for SiteConfig {
    fn from(api: ApiConfig) -> Self {
        let ApiConfig {
            mut floor_maps,
            floor_labels,
            device_types,
        } = api;

        // Labels define the floors and their order; a map without a label
        // is appended under its id.
        let mut floors: IndexMap<String, Floor> = floor_labels
            .into_iter()
            .map(|(id, label)| {
                let image = floor_maps.shift_remove(&id).unwrap_or_default();
                if image.is_empty() {
                    debug!(floor = %id, "floor has no map image");
                }
                (id.clone(), Floor { id, label, image })
            })
            .collect();
        for (id, image) in floor_maps {
            let label = id.clone();
            floors.insert(id.clone(), Floor { id, label, image });
        }

        let device_types = device_types
            .into_iter()
            .map(|(id, info)| {
                (
                    id.clone(),
                    DeviceTypeInfo {
                        id,
                        label: info.label,
                    },
                )
            })
            .collect();

        Self {
            floors,
            device_types,
        }
    }
}

/// Tri-state `status` wins; the boolean `online` is the fallback; a device
/// the server hasn't checked yet is offline.
fn device_status(api: &ApiDevice) -> DeviceStatus {
    if let Some(status) = api.status.as_deref() {
        match status.parse::<DeviceStatus>() {
            Ok(parsed) => return parsed,
            Err(_) => debug!(device = %api.name, status, "unrecognised device status"),
        }
    }
    api.online
        .map_or(DeviceStatus::Offline, DeviceStatus::from_online_flag)
}

fn device_position(api: &ApiDevice) -> Position {
    let (top, left) = match &api.position {
        Some(pos) => (Percent::from_json(&pos.top), Percent::from_json(&pos.left)),
        None => (
            api.pos_top.as_ref().and_then(Percent::from_json),
            api.pos_left.as_ref().and_then(Percent::from_json),
        ),
    };
    if top.is_none() || left.is_none() {
        debug!(device = %api.name, "device has no usable position");
    }
    Position {
        top: top.unwrap_or_default(),
        left: left.unwrap_or_default(),
    }
}

impl From<ApiDevice> for Device {
    fn from(api: ApiDevice) -> Self {
        let status = device_status(&api);
        let position = device_position(&api);
        Self {
            id: DeviceId::from_json(&api.id),
            name: api.name,
            ip: api.ip,
            device_type: api.device_type,
            floor_id: api.floor_id,
            position,
            status,
        }
    }
}

impl From<ApiLogEntry> for LogEntry {
    fn from(api: ApiLogEntry) -> Self {
        Self {
            timestamp: api.timestamp,
            message: api.message,
            status: api.status,
            device: api.device,
            device_type: api.device_type,
        }
    }
}

impl From<ApiStatus> for StatusSnapshot {
    fn from(api: ApiStatus) -> Self {
        let devices: Vec<Device> = api.devices.into_iter().map(Device::from).collect();
        let global = api.global.map_or_else(
            || GlobalStats::from_devices(&devices),
            |g| GlobalStats {
                total: g.total,
                online: g.online,
                offline: g.offline,
            },
        );
        let logs = LogBuffer::from_newest_first(
            api.logs
                .unwrap_or_default()
                .into_iter()
                .map(LogEntry::from)
                .collect(),
        )
        .into_vec();

        Self {
            devices,
            global,
            timestamp: api.timestamp,
            logs,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn api_device(extra: serde_json::Value) -> ApiDevice {
        let mut base = json!({
            "id": "192_168_20_1",
            "name": "CCTV FTI120",
            "ip": "192.168.20.1",
            "type": "cctv",
            "floor_id": "floor_1"
        });
        if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
            obj.extend(more.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn status_prefers_tri_state() {
        let d = Device::from(api_device(json!({"status": "unstable", "online": true})));
        assert_eq!(d.status, DeviceStatus::Unstable);
    }

    #[test]
    fn status_falls_back_to_boolean() {
        let up = Device::from(api_device(json!({"online": true})));
        assert_eq!(up.status, DeviceStatus::Online);
        let garbled = Device::from(api_device(json!({"status": "???", "online": false})));
        assert_eq!(garbled.status, DeviceStatus::Offline);
        let unchecked = Device::from(api_device(json!({})));
        assert_eq!(unchecked.status, DeviceStatus::Offline);
    }

    #[test]
    fn positions_from_nested_css_or_flat_numbers() {
        let nested = Device::from(api_device(json!({
            "position": {"top": "64.3%", "left": "64.8%"}
        })));
        assert_eq!(nested.position, Position::new(64.3, 64.8));

        let flat = Device::from(api_device(json!({"pos_top": 10.5, "pos_left": "20"})));
        assert_eq!(flat.position, Position::new(10.5, 20.0));

        let missing = Device::from(api_device(json!({})));
        assert_eq!(missing.position, Position::default());
    }

    #[test]
    fn config_keeps_order_and_labels() {
        let api: ApiConfig = serde_json::from_value(json!({
            "floor_maps": {"ground": "g.jpg", "floor_1": "1.jpg", "floor_4e": "4e.jpg"},
            "floor_labels": {"floor_1": "Lantai 1", "ground": "Ground Floor"},
            "device_types": {"switch": {"label": "Switch"}, "voip": {"label": "VoIP"}}
        }))
        .unwrap();

        let site = SiteConfig::from(api);
        let ids: Vec<&str> = site.floors.keys().map(String::as_str).collect();
        assert_eq!(ids, ["floor_1", "ground", "floor_4e"]);
        assert_eq!(site.floors["ground"].label, "Ground Floor");
        assert_eq!(site.floors["ground"].image, "g.jpg");
        assert_eq!(site.floors["floor_4e"].label, "floor_4e");
        assert_eq!(site.device_types["voip"].label, "VoIP");
    }

    #[test]
    fn labelled_floor_without_map_is_kept() {
        let api: ApiConfig = serde_json::from_value(json!({
            "floor_maps": {"ground": "g.jpg"},
            "floor_labels": {"ground": "Ground Floor", "rooftop": "Rooftop"},
            "device_types": {}
        }))
        .unwrap();

        let site = SiteConfig::from(api);
        let ids: Vec<&str> = site.floors.keys().map(String::as_str).collect();
        assert_eq!(ids, ["ground", "rooftop"]);
        assert_eq!(site.floors["rooftop"].label, "Rooftop");
        assert_eq!(site.floors["rooftop"].image, "");
    }

    #[test]
    fn snapshot_recomputes_missing_global_and_caps_logs() {
        let logs: Vec<serde_json::Value> = (0..60)
            .map(|i| json!({"timestamp": "2026-01-05 08:00:00", "message": format!("m{i}"), "status": "Online"}))
            .collect();
        let api: ApiStatus = serde_json::from_value(json!({
            "devices": [
                {"id": 1, "name": "a", "type": "switch", "floor_id": "ground", "status": "online"},
                {"id": 2, "name": "b", "type": "switch", "floor_id": "ground", "status": "offline"}
            ],
            "logs": logs
        }))
        .unwrap();

        let snap = StatusSnapshot::from(api);
        assert_eq!(
            snap.global,
            GlobalStats {
                total: 2,
                online: 1,
                offline: 1
            }
        );
        assert_eq!(snap.logs.len(), crate::model::LOG_CAPACITY);
        assert_eq!(snap.logs[0].message, "m0");
        assert_eq!(snap.devices[0].id.as_str(), "1");
    }
}

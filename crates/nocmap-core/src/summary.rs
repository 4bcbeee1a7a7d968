// ── Per-floor summaries ──
//
// Counts behind TV mode and `nocmap status`.

use serde::Serialize;

use crate::model::{Device, DeviceStatus, SiteConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorSummary {
    pub floor_id: String,
    pub label: String,
    pub total: u32,
    pub online: u32,
    /// Everything not online.
    pub offline: u32,
    /// Subset of `offline` reported as unstable.
    pub unstable: u32,
    /// At least one device on the floor is not online.
    pub critical: bool,
}

/// One summary per configured floor, in floor order. Devices on floors the
/// config doesn't know are ignored.
pub fn floor_summaries(site: &SiteConfig, devices: &[Device]) -> Vec<FloorSummary> {
    site.floors
        .values()
        .map(|floor| {
            let mut summary = FloorSummary {
                floor_id: floor.id.clone(),
                label: floor.label.clone(),
                total: 0,
                online: 0,
                offline: 0,
                unstable: 0,
                critical: false,
            };
            for device in devices.iter().filter(|d| d.floor_id == floor.id) {
                summary.total += 1;
                match device.status {
                    DeviceStatus::Online => summary.online += 1,
                    DeviceStatus::Unstable => {
                        summary.offline += 1;
                        summary.unstable += 1;
                    }
                    DeviceStatus::Offline => summary.offline += 1,
                }
            }
            summary.critical = summary.offline > 0;
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, Floor, Position};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn site(ids: &[&str]) -> SiteConfig {
        let floors: IndexMap<String, Floor> = ids
            .iter()
            .map(|id| {
                (
                    (*id).to_owned(),
                    Floor {
                        id: (*id).to_owned(),
                        label: id.to_uppercase(),
                        image: String::new(),
                    },
                )
            })
            .collect();
        SiteConfig {
            floors,
            device_types: IndexMap::new(),
        }
    }

    fn device(id: &str, floor: &str, status: DeviceStatus) -> Device {
        Device {
            id: DeviceId::new(id),
            name: id.into(),
            ip: String::new(),
            device_type: "switch".into(),
            floor_id: floor.into(),
            position: Position::default(),
            status,
        }
    }

    #[test]
    fn counts_per_floor_in_config_order() {
        let site = site(&["ground", "floor_1", "floor_2"]);
        let devices = vec![
            device("a", "floor_1", DeviceStatus::Online),
            device("b", "floor_1", DeviceStatus::Unstable),
            device("c", "ground", DeviceStatus::Online),
            device("d", "attic", DeviceStatus::Offline),
        ];
        let summaries = floor_summaries(&site, &devices);
        let ids: Vec<&str> = summaries.iter().map(|s| s.floor_id.as_str()).collect();
        assert_eq!(ids, ["ground", "floor_1", "floor_2"]);

        assert_eq!(summaries[0].total, 1);
        assert!(!summaries[0].critical);

        assert_eq!(summaries[1].online, 1);
        assert_eq!(summaries[1].offline, 1);
        assert_eq!(summaries[1].unstable, 1);
        assert!(summaries[1].critical);

        assert_eq!(summaries[2].total, 0);
        assert!(!summaries[2].critical);
    }
}

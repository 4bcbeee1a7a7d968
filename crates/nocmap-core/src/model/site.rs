// ── Floors and device types ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One floor of the building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub label: String,
    /// Background image path, relative to the server root.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeInfo {
    pub id: String,
    pub label: String,
}

/// Static site configuration, loaded once per session.
///
/// Both maps keep the server's order, which is the display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub floors: IndexMap<String, Floor>,
    pub device_types: IndexMap<String, DeviceTypeInfo>,
}

impl SiteConfig {
    pub fn floor(&self, id: &str) -> Option<&Floor> {
        self.floors.get(id)
    }

    pub fn first_floor(&self) -> Option<&Floor> {
        self.floors.first().map(|(_, floor)| floor)
    }

    /// Label for a floor id, falling back to the id itself.
    pub fn floor_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.floors.get(id).map_or(id, |f| f.label.as_str())
    }

    /// Label for a device type id, falling back to the id itself.
    pub fn type_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.device_types.get(id).map_or(id, |t| t.label.as_str())
    }

    /// Floor id `offset` steps away from `current`, wrapping around.
    pub fn neighbour_floor(&self, current: &str, offset: isize) -> Option<&str> {
        let len = self.floors.len();
        if len == 0 {
            return None;
        }
        let index = self.floors.get_index_of(current).unwrap_or(0);
        let len_signed = isize::try_from(len).ok()?;
        let index_signed = isize::try_from(index).ok()?;
        let target = usize::try_from((index_signed + offset).rem_euclid(len_signed)).ok()?;
        self.floors.get_index(target).map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        let mut floors = IndexMap::new();
        for (id, label) in [("ground", "Ground"), ("floor_1", "Lantai 1"), ("floor_2", "Lantai 2")] {
            floors.insert(
                id.to_owned(),
                Floor {
                    id: id.to_owned(),
                    label: label.to_owned(),
                    image: format!("static/maps/{id}.jpg"),
                },
            );
        }
        SiteConfig {
            floors,
            device_types: IndexMap::new(),
        }
    }

    #[test]
    fn neighbour_floor_wraps() {
        let site = site();
        assert_eq!(site.neighbour_floor("ground", 1), Some("floor_1"));
        assert_eq!(site.neighbour_floor("ground", -1), Some("floor_2"));
        assert_eq!(site.neighbour_floor("floor_2", 1), Some("ground"));
        assert_eq!(SiteConfig::default().neighbour_floor("ground", 1), None);
    }

    #[test]
    fn labels_fall_back_to_ids() {
        let site = site();
        assert_eq!(site.floor_label("floor_1"), "Lantai 1");
        assert_eq!(site.floor_label("roof"), "roof");
        assert_eq!(site.type_label("cctv"), "cctv");
    }
}

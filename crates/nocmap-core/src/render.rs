// ── Device render set ──
//
// Which devices are drawn on the current floor, and where. Pure functions
// of their inputs; the presentation layer calls them again on every
// data, filter or floor change.

use std::collections::BTreeSet;

use strum::Display;

use crate::model::{Device, DeviceId, DeviceStatus, Percent, Position};
use crate::viewport::{Point, ViewportTransform};

/// Marker colour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusClass {
    Online,
    Offline,
    Unstable,
}

impl From<DeviceStatus> for StatusClass {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Online => Self::Online,
            DeviceStatus::Offline => Self::Offline,
            DeviceStatus::Unstable => Self::Unstable,
        }
    }
}

/// One drawable marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub device_id: DeviceId,
    pub name: String,
    pub ip: String,
    pub device_type: String,
    pub top: Percent,
    pub left: Percent,
    pub status: DeviceStatus,
    pub class: StatusClass,
}

impl From<&Device> for Marker {
    fn from(d: &Device) -> Self {
        Self {
            device_id: d.id.clone(),
            name: d.name.clone(),
            ip: d.ip.clone(),
            device_type: d.device_type.clone(),
            top: d.position.top,
            left: d.position.left,
            status: d.status,
            class: d.status.into(),
        }
    }
}

impl Marker {
    pub fn position(&self) -> Position {
        Position {
            top: self.top,
            left: self.left,
        }
    }
}

/// Devices on `current_floor` whose type is in `active_filters`, in input
/// order.
pub fn render_set<'a>(
    devices: &'a [Device],
    current_floor: &str,
    active_filters: &BTreeSet<String>,
) -> Vec<&'a Device> {
    devices
        .iter()
        .filter(|d| d.floor_id == current_floor && active_filters.contains(&d.device_type))
        .collect()
}

/// Markers for [`render_set`].
pub fn markers(
    devices: &[Device],
    current_floor: &str,
    active_filters: &BTreeSet<String>,
) -> Vec<Marker> {
    render_set(devices, current_floor, active_filters)
        .into_iter()
        .map(Marker::from)
        .collect()
}

// ── Layout ───────────────────────────────────────────────────────────

/// Projects marker percentages onto a map drawn at `width × height`
/// (unzoomed content size) and then through a viewport transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLayout {
    pub width: f64,
    pub height: f64,
}

impl MapLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Unzoomed content coordinates of a position.
    pub fn content_point(&self, position: Position) -> Point {
        Point::new(
            position.left.value() / 100.0 * self.width,
            position.top.value() / 100.0 * self.height,
        )
    }

    /// Screen coordinates of a position under `transform`.
    pub fn project(&self, position: Position, transform: &ViewportTransform) -> Point {
        transform.apply(self.content_point(position))
    }

    /// Integer cell of a position, if it falls inside a `cols × rows` viewport.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn project_cell(
        &self,
        position: Position,
        transform: &ViewportTransform,
        cols: u16,
        rows: u16,
    ) -> Option<(u16, u16)> {
        let p = self.project(position, transform);
        let (x, y) = (p.x.floor(), p.y.floor());
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        if x >= f64::from(cols) || y >= f64::from(rows) {
            return None;
        }
        Some((x as u16, y as u16))
    }

    /// The marker nearest to `screen` within `radius`, if any.
    pub fn hit_test<'a>(
        &self,
        markers: &'a [Marker],
        transform: &ViewportTransform,
        screen: Point,
        radius: f64,
    ) -> Option<&'a Marker> {
        markers
            .iter()
            .map(|m| (m, self.project(m.position(), transform).distance(screen)))
            .filter(|(_, dist)| *dist <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ZoomDirection;
    use pretty_assertions::assert_eq;

    fn device(id: &str, floor: &str, kind: &str, status: DeviceStatus) -> Device {
        Device {
            id: DeviceId::new(id),
            name: format!("dev-{id}"),
            ip: format!("10.0.0.{id}"),
            device_type: kind.into(),
            floor_id: floor.into(),
            position: Position::new(50.0, 25.0),
            status,
        }
    }

    fn filters(types: &[&str]) -> BTreeSet<String> {
        types.iter().map(|t| (*t).to_owned()).collect()
    }

    #[test]
    fn floor_and_type_filtering() {
        let devices = vec![
            device("1", "f1", "ap", DeviceStatus::Online),
            device("2", "f1", "switch", DeviceStatus::Offline),
            device("3", "f2", "ap", DeviceStatus::Online),
        ];
        let set = render_set(&devices, "f1", &filters(&["ap"]));
        let ids: Vec<&str> = set.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1"]);
    }

    #[test]
    fn render_set_is_pure_and_order_preserving() {
        let devices = vec![
            device("9", "f1", "ap", DeviceStatus::Offline),
            device("2", "f1", "switch", DeviceStatus::Online),
            device("5", "f1", "ap", DeviceStatus::Unstable),
        ];
        let active = filters(&["ap", "switch"]);
        let first = render_set(&devices, "f1", &active);
        let second = render_set(&devices, "f1", &active);
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["9", "2", "5"]);
    }

    #[test]
    fn empty_filters_hide_everything() {
        let devices = vec![device("1", "f1", "ap", DeviceStatus::Online)];
        assert!(render_set(&devices, "f1", &BTreeSet::new()).is_empty());
        assert!(render_set(&devices, "f9", &filters(&["ap"])).is_empty());
    }

    #[test]
    fn markers_carry_status_class() {
        let devices = vec![device("1", "f1", "ap", DeviceStatus::Unstable)];
        let markers = markers(&devices, "f1", &filters(&["ap"]));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].class, StatusClass::Unstable);
        assert_eq!(markers[0].class.to_string(), "unstable");
        assert_eq!(markers[0].position(), Position::new(50.0, 25.0));
    }

    #[test]
    fn layout_projects_through_transform() {
        let layout = MapLayout::new(200.0, 100.0);
        let pos = Position::new(50.0, 25.0);
        let mut vt = ViewportTransform::default();
        assert_eq!(layout.project(pos, &vt), Point::new(50.0, 50.0));
        assert_eq!(layout.project_cell(pos, &vt, 80, 60), Some((50, 50)));
        assert_eq!(layout.project_cell(pos, &vt, 40, 60), None);

        vt.zoom_at(Point::new(50.0, 50.0), ZoomDirection::In);
        let p = layout.project(pos, &vt);
        assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let mut near = device("1", "f1", "ap", DeviceStatus::Online);
        near.position = Position::new(10.0, 10.0);
        let mut far = device("2", "f1", "ap", DeviceStatus::Online);
        far.position = Position::new(90.0, 90.0);
        let ms = markers(&[near, far], "f1", &filters(&["ap"]));

        let layout = MapLayout::new(100.0, 100.0);
        let vt = ViewportTransform::default();
        let hit = layout.hit_test(&ms, &vt, Point::new(11.0, 10.5), 2.0);
        assert_eq!(hit.map(|m| m.device_id.as_str()), Some("1"));
        assert!(layout.hit_test(&ms, &vt, Point::new(50.0, 50.0), 2.0).is_none());
    }
}

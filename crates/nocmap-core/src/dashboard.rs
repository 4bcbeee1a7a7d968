// ── Dashboard state ──
//
// Everything the floor-map view needs between renders: site config, the
// latest snapshot, the selected floor, active type filters, the viewport
// and the Map/TV mode. Mutators return `true` when the view must be
// rebuilt; rebuilding always starts from the latest snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::aggregate::{self, StatusBucket};
use crate::error::CoreError;
use crate::model::{Device, GlobalStats, LogEntry, SiteConfig, StatusSnapshot};
use crate::render::{self, Marker};
use crate::summary::{self, FloorSummary};
use crate::viewport::{ViewportTransform, ZoomLimits};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Single floor with markers.
    #[default]
    Map,
    /// Fullscreen grid of every floor.
    Tv,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    config: Option<Arc<SiteConfig>>,
    snapshot: Arc<StatusSnapshot>,
    current_floor: Option<String>,
    active_filters: BTreeSet<String>,
    viewport: ViewportTransform,
    mode: ViewMode,
}

impl DashboardState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            viewport: ViewportTransform::new(limits),
            ..Self::default()
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Install the site config.
    ///
    /// Keeps the current floor if it still exists, else `preferred_floor`
    /// if configured, else the first floor. Filters reset to every type.
    pub fn apply_config(&mut self, config: Arc<SiteConfig>, preferred_floor: Option<&str>) -> bool {
        let keep = self
            .current_floor
            .as_deref()
            .filter(|f| config.floor(f).is_some())
            .map(str::to_owned);
        let floor = keep
            .or_else(|| {
                preferred_floor
                    .filter(|f| config.floor(f).is_some())
                    .map(str::to_owned)
            })
            .or_else(|| config.first_floor().map(|f| f.id.clone()));

        if floor != self.current_floor {
            self.viewport.reset();
        }
        self.current_floor = floor;
        self.active_filters = config.device_types.keys().cloned().collect();
        debug!(
            floor = self.current_floor.as_deref().unwrap_or("-"),
            filters = self.active_filters.len(),
            "dashboard config applied"
        );
        self.config = Some(config);
        true
    }

    /// Replace the snapshot wholesale.
    pub fn apply_snapshot(&mut self, snapshot: Arc<StatusSnapshot>) -> bool {
        self.snapshot = snapshot;
        true
    }

    // ── Floor navigation ─────────────────────────────────────────────

    /// Select `floor_id` and reset the viewport. Selecting the current floor
    /// changes nothing.
    pub fn switch_floor(&mut self, floor_id: &str) -> Result<bool, CoreError> {
        let known = self
            .config
            .as_deref()
            .is_some_and(|c| c.floor(floor_id).is_some());
        if !known {
            return Err(CoreError::FloorNotFound {
                floor: floor_id.to_owned(),
            });
        }
        if self.current_floor.as_deref() == Some(floor_id) {
            return Ok(false);
        }
        self.current_floor = Some(floor_id.to_owned());
        self.viewport.reset();
        Ok(true)
    }

    /// Move `offset` floors along the configured order, wrapping.
    pub fn step_floor(&mut self, offset: isize) -> bool {
        let Some(target) = self.config.as_deref().and_then(|c| {
            c.neighbour_floor(self.current_floor.as_deref().unwrap_or_default(), offset)
                .map(str::to_owned)
        }) else {
            return false;
        };
        self.switch_floor(&target).unwrap_or(false)
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Flip one type filter. Unknown types are ignored.
    pub fn toggle_filter(&mut self, device_type: &str) -> bool {
        let known = self
            .config
            .as_deref()
            .is_some_and(|c| c.device_types.contains_key(device_type));
        if !known {
            return false;
        }
        if !self.active_filters.remove(device_type) {
            self.active_filters.insert(device_type.to_owned());
        }
        true
    }

    pub fn is_filter_active(&self, device_type: &str) -> bool {
        self.active_filters.contains(device_type)
    }

    pub fn active_filters(&self) -> &BTreeSet<String> {
        &self.active_filters
    }

    // ── Modes ────────────────────────────────────────────────────────

    pub fn enter_tv_mode(&mut self) -> bool {
        if self.mode == ViewMode::Tv {
            return false;
        }
        self.mode = ViewMode::Tv;
        true
    }

    /// Back to the map with a fresh viewport.
    pub fn exit_tv_mode(&mut self) -> bool {
        if self.mode == ViewMode::Map {
            return false;
        }
        self.mode = ViewMode::Map;
        self.viewport.reset();
        true
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    // ── Viewport ─────────────────────────────────────────────────────

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportTransform {
        &mut self.viewport
    }

    pub fn reset_viewport(&mut self) -> bool {
        self.viewport.reset();
        true
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn config(&self) -> Option<&SiteConfig> {
        self.config.as_deref()
    }

    pub fn snapshot(&self) -> &Arc<StatusSnapshot> {
        &self.snapshot
    }

    pub fn devices(&self) -> &[Device] {
        &self.snapshot.devices
    }

    pub fn global(&self) -> GlobalStats {
        self.snapshot.global
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.snapshot.logs
    }

    pub fn current_floor(&self) -> Option<&str> {
        self.current_floor.as_deref()
    }

    pub fn current_floor_label(&self) -> &str {
        match (self.config.as_deref(), self.current_floor.as_deref()) {
            (Some(config), Some(floor)) => config.floor_label(floor),
            (None, Some(floor)) => floor,
            (_, None) => "",
        }
    }

    pub fn render_set(&self) -> Vec<&Device> {
        match self.current_floor.as_deref() {
            Some(floor) => render::render_set(&self.snapshot.devices, floor, &self.active_filters),
            None => Vec::new(),
        }
    }

    pub fn markers(&self) -> Vec<Marker> {
        match self.current_floor.as_deref() {
            Some(floor) => render::markers(&self.snapshot.devices, floor, &self.active_filters),
            None => Vec::new(),
        }
    }

    pub fn summaries(&self) -> Vec<FloorSummary> {
        self.config
            .as_deref()
            .map(|c| summary::floor_summaries(c, &self.snapshot.devices))
            .unwrap_or_default()
    }

    pub fn device_list(&self, bucket: StatusBucket, type_filter: Option<&str>) -> Vec<&Device> {
        aggregate::device_list(&self.snapshot.devices, bucket, type_filter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, DeviceStatus, DeviceTypeInfo, Floor, Position};
    use crate::viewport::{Point, ZoomDirection};
    use indexmap::IndexMap;

    fn site() -> Arc<SiteConfig> {
        let floors: IndexMap<String, Floor> = ["f1", "f2"]
            .into_iter()
            .map(|id| {
                (
                    id.to_owned(),
                    Floor {
                        id: id.to_owned(),
                        label: format!("Floor {id}"),
                        image: String::new(),
                    },
                )
            })
            .collect();
        let device_types: IndexMap<String, DeviceTypeInfo> = ["ap", "switch"]
            .into_iter()
            .map(|id| {
                (
                    id.to_owned(),
                    DeviceTypeInfo {
                        id: id.to_owned(),
                        label: id.to_uppercase(),
                    },
                )
            })
            .collect();
        Arc::new(SiteConfig {
            floors,
            device_types,
        })
    }

    fn snapshot() -> Arc<StatusSnapshot> {
        let devices = [
            ("1", "f1", "ap", DeviceStatus::Online),
            ("2", "f1", "switch", DeviceStatus::Offline),
            ("3", "f2", "ap", DeviceStatus::Online),
        ]
        .into_iter()
        .map(|(id, floor, kind, status)| Device {
            id: DeviceId::new(id),
            name: format!("dev{id}"),
            ip: String::new(),
            device_type: kind.into(),
            floor_id: floor.into(),
            position: Position::new(10.0, 10.0),
            status,
        })
        .collect::<Vec<_>>();
        Arc::new(StatusSnapshot {
            global: GlobalStats::from_devices(&devices),
            devices,
            timestamp: None,
            logs: Vec::new(),
        })
    }

    fn ready() -> DashboardState {
        let mut state = DashboardState::default();
        state.apply_config(site(), None);
        state.apply_snapshot(snapshot());
        state
    }

    fn ids(list: &[&Device]) -> Vec<String> {
        list.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn config_selects_first_floor_and_all_filters() {
        let state = ready();
        assert_eq!(state.current_floor(), Some("f1"));
        assert!(state.is_filter_active("ap") && state.is_filter_active("switch"));
        assert_eq!(ids(&state.render_set()), ["1", "2"]);
        assert_eq!(state.current_floor_label(), "Floor f1");
    }

    #[test]
    fn preferred_floor_used_when_known() {
        let mut state = DashboardState::default();
        state.apply_config(site(), Some("f2"));
        assert_eq!(state.current_floor(), Some("f2"));

        let mut other = DashboardState::default();
        other.apply_config(site(), Some("roof"));
        assert_eq!(other.current_floor(), Some("f1"));
    }

    #[test]
    fn toggling_filter_narrows_render_set() {
        let mut state = ready();
        assert!(state.toggle_filter("switch"));
        assert_eq!(ids(&state.render_set()), ["1"]);
        assert!(state.toggle_filter("switch"));
        assert_eq!(ids(&state.render_set()), ["1", "2"]);
        assert!(!state.toggle_filter("voip"));
    }

    #[test]
    fn switching_floor_resets_viewport() {
        let mut state = ready();
        state
            .viewport_mut()
            .zoom_at(Point::new(30.0, 30.0), ZoomDirection::In);
        assert!(state.switch_floor("f2").unwrap());
        assert!(state.viewport().is_identity());
        assert_eq!(ids(&state.render_set()), ["3"]);
        assert!(!state.switch_floor("f2").unwrap());
        assert!(matches!(
            state.switch_floor("basement"),
            Err(CoreError::FloorNotFound { .. })
        ));
    }

    #[test]
    fn step_floor_wraps() {
        let mut state = ready();
        assert!(state.step_floor(1));
        assert_eq!(state.current_floor(), Some("f2"));
        assert!(state.step_floor(1));
        assert_eq!(state.current_floor(), Some("f1"));
        assert!(state.step_floor(-1));
        assert_eq!(state.current_floor(), Some("f2"));
    }

    #[test]
    fn tv_mode_round_trip_resets_viewport() {
        let mut state = ready();
        state.viewport_mut().pan_by(Point::new(20.0, 0.0));
        assert!(state.enter_tv_mode());
        assert!(!state.enter_tv_mode());
        assert_eq!(state.mode(), ViewMode::Tv);
        assert_eq!(state.summaries().len(), 2);
        assert!(state.summaries()[0].critical);
        assert!(state.exit_tv_mode());
        assert!(state.viewport().is_identity());
        assert!(!state.exit_tv_mode());
    }

    #[test]
    fn snapshot_replacement_is_wholesale() {
        let mut state = ready();
        state.apply_snapshot(Arc::new(StatusSnapshot::default()));
        assert!(state.render_set().is_empty());
        assert_eq!(state.global(), GlobalStats::default());
        state.apply_snapshot(snapshot());
        assert_eq!(state.markers().len(), 2);
        assert_eq!(
            ids(&state.device_list(StatusBucket::Offline, None)),
            ["2"]
        );
    }
}

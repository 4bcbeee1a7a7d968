//! Fixtures shared by the screen tests.

use std::sync::Arc;

use indexmap::IndexMap;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use nocmap_core::{
    Device, DeviceId, DeviceStatus, DeviceTypeInfo, Floor, GlobalStats, LogEntry, Position,
    SiteConfig, StatusSnapshot,
};

use crate::component::Component;

pub fn site() -> Arc<SiteConfig> {
    let floors: IndexMap<String, Floor> = [("ground", "Ground Floor"), ("floor_1", "Lantai 1")]
        .into_iter()
        .map(|(id, label)| {
            (
                id.to_owned(),
                Floor {
                    id: id.to_owned(),
                    label: label.to_owned(),
                    image: format!("static/maps/{id}.jpg"),
                },
            )
        })
        .collect();
    let device_types: IndexMap<String, DeviceTypeInfo> = [("switch", "Switch"), ("cctv", "CCTV")]
        .into_iter()
        .map(|(id, label)| {
            (
                id.to_owned(),
                DeviceTypeInfo {
                    id: id.to_owned(),
                    label: label.to_owned(),
                },
            )
        })
        .collect();
    Arc::new(SiteConfig {
        floors,
        device_types,
    })
}

fn device(id: &str, name: &str, kind: &str, floor: &str, pos: (f64, f64), status: DeviceStatus) -> Device {
    Device {
        id: DeviceId::from(id),
        name: name.to_owned(),
        ip: id.replace('_', "."),
        device_type: kind.to_owned(),
        floor_id: floor.to_owned(),
        position: Position::new(pos.0, pos.1),
        status,
    }
}

/// Two floors: ground all online, floor_1 with one offline and one
/// unstable device.
pub fn snapshot() -> Arc<StatusSnapshot> {
    let devices = vec![
        device("10_0_0_1", "Core Switch", "switch", "ground", (40.0, 12.5), DeviceStatus::Online),
        device("10_0_0_5", "Lobby Cam", "cctv", "ground", (70.0, 60.0), DeviceStatus::Online),
        device("10_0_0_9", "CCTV Lobby", "cctv", "floor_1", (10.0, 80.0), DeviceStatus::Offline),
        device("10_0_1_20", "AP Lab", "switch", "floor_1", (25.0, 25.0), DeviceStatus::Unstable),
    ];
    let logs = vec![
        LogEntry {
            timestamp: "2024-05-01 07:59:00".into(),
            message: "CCTV Lobby offline".into(),
            status: "Offline".into(),
            device: Some("CCTV Lobby".into()),
            device_type: Some("cctv".into()),
        },
        LogEntry {
            timestamp: "2024-05-01 07:00:00".into(),
            message: "Core Switch online".into(),
            status: "Online".into(),
            device: Some("Core Switch".into()),
            device_type: Some("switch".into()),
        },
    ];
    Arc::new(StatusSnapshot {
        global: GlobalStats::from_devices(&devices),
        devices,
        timestamp: Some("2024-05-01 08:00:00".into()),
        logs,
    })
}

/// Render `component` into a `width × height` buffer and return its text,
/// one line per row.
#[allow(clippy::unwrap_used)]
pub fn render_to_string(component: &dyn Component, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| component.render(frame, frame.area()))
        .unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

//! `nocmap status`: building-wide counts, per-floor breakdown and the
//! aggregate device drill-down.

use serde::Serialize;
use tabled::Tabled;

use nocmap_core::aggregate::{self, StatusBucket};
use nocmap_core::summary::{self, FloorSummary};
use nocmap_core::{Controller, Device, GlobalStats};

use crate::cli::{Bucket, GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FloorRow {
    #[tabled(rename = "Floor")]
    label: String,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "Online")]
    online: u32,
    #[tabled(rename = "Offline")]
    offline: u32,
    #[tabled(rename = "Unstable")]
    unstable: u32,
    #[tabled(rename = "")]
    flag: String,
}

impl From<&FloorSummary> for FloorRow {
    fn from(s: &FloorSummary) -> Self {
        Self {
            label: s.label.clone(),
            total: s.total,
            online: s.online,
            offline: s.offline,
            unstable: s.unstable,
            flag: if s.critical { "!".into() } else { String::new() },
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Floor")]
    floor: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    global: GlobalStats,
    timestamp: Option<&'a str>,
    floors: Vec<FloorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    devices: Option<Vec<&'a Device>>,
}

fn bucket(b: Bucket) -> StatusBucket {
    match b {
        Bucket::Total => StatusBucket::Total,
        Bucket::Online => StatusBucket::Online,
        Bucket::Offline => StatusBucket::Offline,
    }
}

pub async fn handle(
    controller: &Controller,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let site = util::site_config(controller)?;
    util::check_known(&site, args.floor.as_deref(), args.device_type.as_deref())?;
    let snapshot = controller.refresh_status().await?;

    let mut floors = summary::floor_summaries(&site, &snapshot.devices);
    if let Some(floor) = args.floor.as_deref() {
        floors.retain(|s| s.floor_id == floor);
    }

    let devices = args.list.map(|b| {
        let mut list = aggregate::device_list(&snapshot.devices, bucket(b), args.device_type.as_deref());
        if let Some(floor) = args.floor.as_deref() {
            list.retain(|d| d.floor_id == floor);
        }
        list
    });

    let report = StatusReport {
        global: snapshot.global,
        timestamp: snapshot.timestamp.as_deref(),
        floors,
        devices,
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let mut text = format!(
                "Total: {}  Online: {}  Offline: {}",
                r.global.total, r.global.online, r.global.offline
            );
            if let Some(ts) = r.timestamp {
                text.push_str(&format!("  (as of {ts})"));
            }
            let rows: Vec<FloorRow> = r.floors.iter().map(FloorRow::from).collect();
            text.push('\n');
            text.push_str(&output::render_table(&rows));
            if let (Some(list), Some(b)) = (&r.devices, args.list) {
                let rows: Vec<DeviceRow> = list
                    .iter()
                    .map(|d| DeviceRow {
                        name: d.name.clone(),
                        ip: d.ip.clone(),
                        kind: site.type_label(&d.device_type).to_owned(),
                        floor: site.floor_label(&d.floor_id).to_owned(),
                        status: output::paint_status(d.status, color),
                    })
                    .collect();
                text.push_str(&format!("\n{}\n", bucket(b).title()));
                text.push_str(&output::render_table(&rows));
            }
            text
        },
        |r| match &r.devices {
            Some(list) => list.iter().map(|d| d.id.to_string()).collect::<Vec<_>>().join("\n"),
            None => format!("{} {} {}", r.global.total, r.global.online, r.global.offline),
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

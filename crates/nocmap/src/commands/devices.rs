//! Device command handlers (admin API).

use serde::Serialize;
use tabled::Tabled;

use nocmap_core::admin::{self, AdminQuery};
use nocmap_core::{AdminDevice, Command as CoreCommand, CommandResult, Controller, DeviceDraft};

use crate::cli::{DeviceAddArgs, DeviceUpdateArgs, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Floor")]
    floor: String,
    #[tabled(rename = "Top %")]
    top: String,
    #[tabled(rename = "Left %")]
    left: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&AdminDevice> for DeviceRow {
    fn from(d: &AdminDevice) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            ip: d.ip.clone(),
            device_type: d.device_type.clone(),
            floor: d.floor_id.clone(),
            top: format!("{:.2}", d.pos_top),
            left: format!("{:.2}", d.pos_left),
            active: if d.is_active { "yes" } else { "no" }.into(),
        }
    }
}

#[derive(Serialize)]
struct FilterOptions {
    floors: Vec<String>,
    types: Vec<String>,
}

fn detail(d: &AdminDevice) -> String {
    [
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name),
        format!("IP:       {}", d.ip),
        format!("Type:     {}", d.device_type),
        format!("Floor:    {}", d.floor_id),
        format!("Position: top {:.2}%, left {:.2}%", d.pos_top, d.pos_left),
        format!("Active:   {}", if d.is_active { "yes" } else { "no" }),
    ]
    .join("\n")
}

fn filters_detail(f: &FilterOptions) -> String {
    [
        format!("Floors: {}", f.floors.join(", ")),
        format!("Types:  {}", f.types.join(", ")),
    ]
    .join("\n")
}

// ── Draft building ──────────────────────────────────────────────────

fn draft_from_add(args: DeviceAddArgs) -> DeviceDraft {
    DeviceDraft {
        name: args.name,
        ip: args.ip,
        device_type: args.device_type,
        floor_id: args.floor,
        pos_top: args.top,
        pos_left: args.left,
        is_active: !args.inactive,
    }
}

/// Overlay the flags that were given onto the stored device.
fn merge_update(existing: &AdminDevice, args: DeviceUpdateArgs) -> DeviceDraft {
    let mut draft = DeviceDraft::from(existing);
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(ip) = args.ip {
        draft.ip = ip;
    }
    if let Some(kind) = args.device_type {
        draft.device_type = kind;
    }
    if let Some(floor) = args.floor {
        draft.floor_id = floor;
    }
    if let Some(top) = args.top {
        draft.pos_top = top;
    }
    if let Some(left) = args.left {
        draft.pos_left = left;
    }
    if let Some(active) = args.active {
        draft.is_active = active;
    }
    draft
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(filter) => {
            let all = controller.list_admin_devices().await?;
            let query = AdminQuery {
                search: filter.search.unwrap_or_default(),
                floor: filter.floor,
                device_type: filter.device_type,
            };
            let rows: Vec<&AdminDevice> = admin::filter_admin_devices(&all, &query);
            let out = output::render_list(
                &global.output,
                &rows,
                |d| DeviceRow::from(*d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Filters => {
            let all = controller.list_admin_devices().await?;
            let options = FilterOptions {
                floors: admin::distinct_floors(&all),
                types: admin::distinct_types(&all),
            };
            let out = output::render_single(&global.output, &options, filters_detail, |f| {
                f.floors.iter().chain(&f.types).cloned().collect::<Vec<_>>().join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = controller.get_admin_device(id).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add(add) => {
            let site = util::site_config(controller)?;
            util::check_known(&site, Some(&add.floor), Some(&add.device_type))?;
            let draft = draft_from_add(add);
            let result = controller
                .execute(CoreCommand::CreateDevice { draft })
                .await?;
            if let CommandResult::Created { id } = result {
                output::print_output(&id.to_string(), global.quiet);
            }
            if !global.quiet {
                eprintln!("Device added");
            }
            Ok(())
        }

        DevicesCommand::Update(update) => {
            let site = util::site_config(controller)?;
            util::check_known(&site, update.floor.as_deref(), update.device_type.as_deref())?;
            let id = update.id;
            let existing = controller.get_admin_device(id).await?;
            let draft = merge_update(&existing, update);
            controller
                .execute(CoreCommand::UpdateDevice { id, draft })
                .await?;
            if !global.quiet {
                eprintln!("Device {id} updated");
            }
            Ok(())
        }

        DevicesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete device {id}?"), "devices delete", global.yes)? {
                return Ok(());
            }
            controller.execute(CoreCommand::DeleteDevice { id }).await?;
            if !global.quiet {
                eprintln!("Device {id} deleted");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> AdminDevice {
        AdminDevice {
            id: 7,
            name: "CCTV Lobby".into(),
            ip: "192.168.20.1".into(),
            device_type: "cctv".into(),
            floor_id: "ground".into(),
            pos_top: 10.0,
            pos_left: 20.0,
            is_active: true,
        }
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let args = DeviceUpdateArgs {
            id: 7,
            name: None,
            ip: None,
            device_type: None,
            floor: Some("floor_1".into()),
            top: Some(55.5),
            left: None,
            active: Some(false),
        };
        let draft = merge_update(&stored(), args);
        assert_eq!(draft.name, "CCTV Lobby");
        assert_eq!(draft.floor_id, "floor_1");
        assert!((draft.pos_top - 55.5).abs() < f64::EPSILON);
        assert!((draft.pos_left - 20.0).abs() < f64::EPSILON);
        assert!(!draft.is_active);
    }

    #[test]
    fn detail_formats_position_with_two_decimals() {
        let text = detail(&stored());
        assert!(text.contains("top 10.00%, left 20.00%"));
    }
}

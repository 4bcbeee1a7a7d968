//! `nocmap place`: turn a click on a floor image into a stored position.

use nocmap_core::picker::{self, PickedPosition};
use nocmap_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, PlaceArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(p: &PickedPosition) -> String {
    [
        format!("Top:  {}", p.top_display()),
        format!("Left: {}", p.left_display()),
    ]
    .join("\n")
}

/// Compute and print the position. Needs no server.
pub fn compute(args: &PlaceArgs, global: &GlobalOpts) -> Result<PickedPosition, CliError> {
    let picked = picker::pick(args.x, args.y, args.width, args.height)?;
    let out = output::render_single(&global.output, &picked, detail, |p| {
        format!("{} {}", p.top_display(), p.left_display())
    });
    output::print_output(&out, global.quiet);
    Ok(picked)
}

/// Compute the position and store it on `--device`.
pub async fn handle(
    controller: &Controller,
    args: &PlaceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let picked = compute(args, global)?;
    let Some(id) = args.device else {
        return Ok(());
    };

    if let Some(floor) = args.floor.as_deref() {
        let site = util::site_config(controller)?;
        util::check_known(&site, Some(floor), None)?;
    }

    let existing = controller.get_admin_device(id).await?;
    let mut draft = nocmap_core::DeviceDraft::from(&existing);
    draft.pos_top = picked.top;
    draft.pos_left = picked.left;
    if let Some(floor) = args.floor.clone() {
        draft.floor_id = floor;
    }
    controller
        .execute(CoreCommand::UpdateDevice { id, draft })
        .await?;
    if !global.quiet {
        eprintln!("Device {id} moved to {picked}");
    }
    Ok(())
}

//! `nocmap health`

use nocmap_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let health = controller.health().await?;
    let out = output::render_single(
        &global.output,
        &health,
        |h| {
            [
                format!("Status:          {}", h.status),
                format!("Timestamp:       {}", h.timestamp.as_deref().unwrap_or("-")),
                format!("Devices tracked: {}", h.devices_tracked),
                format!("With status:     {}", h.devices_with_status),
            ]
            .join("\n")
        },
        |h| h.status.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

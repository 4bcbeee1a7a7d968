//! `nocmap logs`: recent status changes, newest first.

use tabled::Tabled;

use nocmap_core::{Controller, LOG_CAPACITY, LogEntry};

use crate::cli::{GlobalOpts, LogsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

pub async fn handle(
    controller: &Controller,
    args: &LogsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut entries: Vec<LogEntry> = controller.logs().await?;
    entries.truncate(args.limit.min(LOG_CAPACITY));

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| LogRow {
            time: e.time_of_day(),
            status: output::paint_log_status(&e.status, e.level(), color),
            message: e.message.clone(),
        },
        |e| format!("{} {}", e.timestamp, e.message),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

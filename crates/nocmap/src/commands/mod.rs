//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod health;
pub mod logs;
pub mod place;
pub mod status;
pub mod util;

use nocmap_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Whether `cmd` goes through the admin API and so needs a login.
pub fn needs_admin(cmd: &Command) -> bool {
    match cmd {
        Command::Devices(_) => true,
        Command::Place(args) => args.device.is_some(),
        _ => false,
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Place(args) => place::handle(controller, &args, global).await,
        Command::Status(args) => status::handle(controller, &args, global).await,
        Command::Logs(args) => logs::handle(controller, &args, global).await,
        Command::Health => health::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the server dispatcher".into(),
        )),
    }
}

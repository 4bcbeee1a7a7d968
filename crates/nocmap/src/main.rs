mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nocmap_core::{Controller, ControllerConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "nocmap", &mut std::io::stdout());
            Ok(())
        }

        // Picking a position without storing it is pure arithmetic
        Command::Place(args) if args.device.is_none() => {
            commands::place::compute(&args, &cli.global).map(|_| ())
        }

        // All other commands require a server connection
        cmd => {
            let admin = commands::needs_admin(&cmd);
            let controller_config = build_controller_config(&cli.global, admin)?;
            let controller = Controller::new(controller_config);
            controller.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.disconnect().await;
            result
        }
    }
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
fn build_controller_config(
    global: &cli::GlobalOpts,
    admin: bool,
) -> Result<ControllerConfig, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return config::resolve_profile(profile, &profile_name, global, admin);
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: config::available_profiles(&cfg),
        });
    }

    // No profile found -- try to build from CLI flags / env vars alone
    config::resolve_flags_only(global, &profile_name, admin)
}

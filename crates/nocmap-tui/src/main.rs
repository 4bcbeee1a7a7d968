//! `nocmap-tui` — live floor-map dashboard for a nocmap NOC server.
//!
//! Built on [ratatui](https://ratatui.rs) with snapshots from
//! `nocmap-core`'s [`SnapshotStream`](nocmap_core::SnapshotStream). Screens
//! are navigable via number keys (1-4): Map, TV, Devices and Log.
//!
//! Logs are written to a file (default `/tmp/nocmap-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards every
//! snapshot and connection-state change from the controller into the TUI
//! action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
#[cfg(test)]
mod test_support;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use nocmap_config::{Defaults, Profile};
use nocmap_core::Controller;

use crate::app::App;

/// Terminal floor-map dashboard for nocmap NOC servers.
#[derive(Parser, Debug)]
#[command(name = "nocmap-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "NOCMAP_PROFILE")]
    profile: Option<String>,

    /// Server URL, overriding the profile (e.g., http://noc.local:5000)
    #[arg(short, long, env = "NOCMAP_SERVER")]
    server: Option<String>,

    /// Floor to show first (defaults to the profile's `default_floor`)
    #[arg(short, long)]
    floor: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/nocmap-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may go to stdout/stderr while the
/// terminal is in raw mode. Hold the returned guard until exit so buffered
/// lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("nocmap_tui={log_level},nocmap_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("nocmap-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Pick the profile from the config file and apply CLI overrides.
///
/// The dashboard only reads public endpoints, so admin credentials are
/// dropped before the controller config is built.
fn resolve_profile(cli: &Cli) -> Result<(String, Profile, Defaults)> {
    let mut cfg = nocmap_config::load_config_or_default();
    let name = cli
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    let mut profile = match cfg.profiles.remove(&name) {
        Some(profile) => profile,
        None if cli.profile.is_some() => bail!(
            "profile '{name}' not found in {}",
            nocmap_config::config_path().display()
        ),
        None => Profile::default(),
    };

    if let Some(server) = &cli.server {
        profile.server.clone_from(server);
    }
    if profile.server.trim().is_empty() {
        bail!(
            "no server configured: pass --server or add a profile to {}",
            nocmap_config::config_path().display()
        );
    }
    profile.username = None;

    Ok((name, profile, cfg.defaults))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (profile_name, profile, defaults) = resolve_profile(&cli)?;
    let limits = profile.zoom_limits()?;
    let preferred_floor = cli.floor.clone().or_else(|| profile.default_floor.clone());
    let config = nocmap_config::profile_to_controller_config(&profile, &profile_name, &defaults)?;

    info!(
        server = %config.url,
        profile = %profile_name,
        push = config.push_enabled,
        "starting nocmap-tui"
    );

    let mut app = App::new(Controller::new(config), limits, preferred_floor);
    app.run().await
}

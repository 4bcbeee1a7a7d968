//! Clap derive structures for the `nocmap` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only clap and clap_complete may be used here: `build.rs` includes this
//! file directly to render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nocmap -- floor-map NOC administration from the command line
#[derive(Debug, Parser)]
#[command(
    name = "nocmap",
    version,
    about = "Manage floor-map NOC devices from the command line",
    long_about = "Administer the devices shown on a floor-map network operations dashboard.\n\n\
        Reads live status from the public dashboard API and manages devices\n\
        through the session-authenticated admin API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "NOCMAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "NOCMAP_SERVER", global = true)]
    pub server: Option<String>,

    /// Admin username (overrides profile)
    #[arg(long, short = 'u', env = "NOCMAP_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NOCMAP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NOCMAP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "NOCMAP_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage devices placed on the floor maps (admin)
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Convert a click on a floor image into a stored position
    Place(PlaceArgs),

    /// Building-wide and per-floor device status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Recent status-change log
    Logs(LogsArgs),

    /// Server health check
    Health,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List configured devices, newest first
    #[command(alias = "ls")]
    List(DeviceFilterArgs),

    /// Show the floors and types devices are using
    Filters,

    /// Get device details
    Get {
        /// Device ID
        id: i64,
    },

    /// Add a device
    Add(DeviceAddArgs),

    /// Update fields of a device
    Update(DeviceUpdateArgs),

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device ID
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct DeviceFilterArgs {
    /// Case-insensitive match on name, or substring of IP
    #[arg(long, short = 'f')]
    pub search: Option<String>,

    /// Only devices on this floor
    #[arg(long)]
    pub floor: Option<String>,

    /// Only devices of this type
    #[arg(long = "type", short = 't')]
    pub device_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeviceAddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// IP address monitored by the server
    #[arg(long)]
    pub ip: String,

    /// Device type ID (see `nocmap status`)
    #[arg(long = "type", short = 't')]
    pub device_type: String,

    /// Floor ID
    #[arg(long)]
    pub floor: String,

    /// Vertical position, percent of image height (0-100)
    #[arg(long)]
    pub top: f64,

    /// Horizontal position, percent of image width (0-100)
    #[arg(long)]
    pub left: f64,

    /// Create the device disabled
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Debug, Args)]
pub struct DeviceUpdateArgs {
    /// Device ID
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub ip: Option<String>,

    #[arg(long = "type", short = 't')]
    pub device_type: Option<String>,

    #[arg(long)]
    pub floor: Option<String>,

    #[arg(long)]
    pub top: Option<f64>,

    #[arg(long)]
    pub left: Option<f64>,

    /// Enable or disable monitoring
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: Option<bool>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLACE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Click X offset in pixels from the image's left edge
    #[arg(allow_negative_numbers = true)]
    pub x: f64,

    /// Click Y offset in pixels from the image's top edge
    #[arg(allow_negative_numbers = true)]
    pub y: f64,

    /// Rendered image width in pixels
    #[arg(long)]
    pub width: f64,

    /// Rendered image height in pixels
    #[arg(long)]
    pub height: f64,

    /// Store the position on this device (admin)
    #[arg(long)]
    pub device: Option<i64>,

    /// Also move the device to this floor
    #[arg(long, requires = "device")]
    pub floor: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS & LOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Restrict to one floor
    #[arg(long)]
    pub floor: Option<String>,

    /// Also list the devices in this bucket, offline first
    #[arg(long)]
    pub list: Option<Bucket>,

    /// Narrow the device list to one type
    #[arg(long = "type", short = 't', requires = "list")]
    pub device_type: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Bucket {
    Total,
    Online,
    Offline,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Number of entries to show (server keeps at most 50)
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g., "server", "zoom_max", "default_floor")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the admin password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}


//! CLI configuration: thin wrapper around `nocmap_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --username, etc.).

use std::time::Duration;

use nocmap_core::{ControllerConfig, Credentials, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nocmap_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values. Credentials are
/// only resolved when `admin` is set, so read-only commands never touch the
/// keyring.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    admin: bool,
) -> Result<ControllerConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let server = global.server.as_deref().unwrap_or(&profile.server);
    let url = nocmap_config::parse_server(server)?;

    // 2. Admin credentials (username flag overrides the profile's)
    let credentials = if admin {
        let mut effective = Profile::new(server);
        effective.username = global.username.clone().or_else(|| profile.username.clone());
        effective.password.clone_from(&profile.password);
        effective.password_env.clone_from(&profile.password_env);
        let creds = nocmap_config::resolve_credentials(&effective, profile_name)?;
        Some(creds.ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?)
    } else {
        None
    };

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(oneshot_config(url, credentials, tls, global.timeout))
}

/// Build a config from flags alone when no profile exists.
pub fn resolve_flags_only(
    global: &GlobalOpts,
    profile_name: &str,
    admin: bool,
) -> Result<ControllerConfig, CliError> {
    let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let mut profile = Profile::new(server);
    profile.username.clone_from(&global.username);
    resolve_profile(&profile, profile_name, global, admin)
}

fn oneshot_config(
    url: url::Url,
    credentials: Option<Credentials>,
    tls: TlsVerification,
    timeout_secs: u64,
) -> ControllerConfig {
    let mut config = ControllerConfig::new(url);
    config.credentials = credentials;
    config.tls = tls;
    config.timeout = Duration::from_secs(timeout_secs);
    config.push_enabled = false;
    config.poll_interval_secs = 0;
    config.config_retries = 0;
    config
}

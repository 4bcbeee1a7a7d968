//! Shared configuration for the nocmap CLI and TUI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `nocmap_core::ControllerConfig`. Both binaries
//! depend on this crate; the CLI adds `GlobalOpts`-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nocmap_core::{ControllerConfig, Credentials, TlsVerification, ZoomLimits};

const KEYRING_SERVICE: &str = "nocmap";

/// Env var consulted for the admin password when the profile names none.
pub const PASSWORD_ENV: &str = "NOCMAP_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick a profile: `requested`, else `default_profile`, else `"default"`.
    pub fn profile<'a>(&'a self, requested: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Profile {
    /// Server base URL (e.g., "http://noc.local:5000").
    pub server: String,

    /// Admin username. Without it only the public dashboard API is used.
    pub username: Option<String>,

    /// Admin password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the admin password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Use the Socket.IO push channel (default true).
    pub push: Option<bool>,

    /// Poll interval in seconds when push is off or gives up.
    pub poll_interval: Option<u64>,

    /// Upper zoom bound for the map view.
    pub zoom_max: Option<f64>,

    /// Floor shown first in the map view.
    pub default_floor: Option<String>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Zoom range for the map: `[0.5, zoom_max]`, `zoom_max` defaulting to 5.
    pub fn zoom_limits(&self) -> Result<ZoomLimits, ConfigError> {
        let default = ZoomLimits::default();
        match self.zoom_max {
            None => Ok(default),
            Some(max) => ZoomLimits::new(default.min(), max).map_err(|e| ConfigError::Validation {
                field: "zoom_max".into(),
                reason: e.to_string(),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "nocmap", "nocmap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nocmap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered over defaults and under `NOCMAP_` env vars
/// (`NOCMAP_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NOCMAP_").split("__").ignore(&["password"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store the admin password for `profile_name` in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    use secrecy::ExposeSecret;
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve the admin password: `password_env` → `NOCMAP_PASSWORD` →
/// keyring → plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Env vars
    let env_names = profile.password_env.as_deref().into_iter().chain([PASSWORD_ENV]);
    for name in env_names {
        if let Ok(val) = std::env::var(name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Some(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Admin credentials for a profile, or `None` when it has no username.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };
    let password = resolve_password(profile, profile_name).ok_or_else(|| {
        ConfigError::NoCredentials {
            profile: profile_name.into(),
        }
    })?;
    Ok(Some(Credentials { username, password }))
}

/// Build a `ControllerConfig` from a profile, no CLI flag overrides.
///
/// Suitable for the TUI: push on unless the profile says otherwise, and
/// config loading retried indefinitely.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_server(&profile.server)?;

    let mut config = ControllerConfig::new(url);
    config.credentials = resolve_credentials(profile, profile_name)?;
    config.tls = tls_for(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.push_enabled = profile.push.unwrap_or(true);
    if let Some(secs) = profile.poll_interval {
        config.poll_interval_secs = secs;
    }
    config.config_retries = u32::MAX;
    Ok(config)
}

pub fn parse_server(server: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Config {
        let mut profile = Profile::new("http://noc.local:5000");
        profile.username = Some("admin".into());
        profile.password = Some("plain".into());
        profile.zoom_max = Some(3.0);
        profile.default_floor = Some("floor_1".into());
        let mut config = Config::default();
        config.profiles.insert("default".into(), profile);
        config
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = sample();

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults.output, "table");
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn partial_profile_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_profile = \"lab\"\n[profiles.lab]\nserver = \"https://10.0.0.2\"\npush = false\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(profile.push, Some(false));
        assert!(matches!(
            config.profile(Some("prod")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn controller_config_from_profile() {
        let mut profile = Profile::new("http://noc.local:5000");
        profile.push = Some(false);
        profile.poll_interval = Some(15);
        profile.insecure = Some(true);
        let config = profile_to_controller_config(&profile, "t", &Defaults::default()).unwrap();

        assert_eq!(config.url.as_str(), "http://noc.local:5000/");
        assert!(config.credentials.is_none());
        assert!(!config.push_enabled);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_server_rejected() {
        assert!(parse_server("not a url").is_err());
        assert!(matches!(
            parse_server("ftp://noc.local"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn zoom_limits_from_profile() {
        let mut profile = Profile::new("http://x");
        assert!((profile.zoom_limits().unwrap().max() - 5.0).abs() < f64::EPSILON);
        profile.zoom_max = Some(3.0);
        assert!((profile.zoom_limits().unwrap().max() - 3.0).abs() < f64::EPSILON);
        profile.zoom_max = Some(0.1);
        assert!(profile.zoom_limits().is_err());
    }
}

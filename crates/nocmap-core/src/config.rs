// ── Runtime connection configuration ──
//
// These types describe *how* to reach a NOC server. They carry credential
// data and connection tuning, but never touch disk. The CLI/TUI builds a
// `ControllerConfig` (usually through nocmap-config) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Admin login credentials.
///
/// The dashboard API is public; credentials are only needed for the admin
/// device API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on the LAN).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single NOC server.
///
/// Built by CLI/TUI, passed to `Controller`.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Server URL (e.g., `http://noc.local:5000`).
    pub url: Url,
    /// Admin credentials, if the consumer needs the admin API.
    pub credentials: Option<Credentials>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Subscribe to the Socket.IO push channel.
    pub push_enabled: bool,
    /// Poll interval when push is disabled or gives up (seconds). 0 = never.
    pub poll_interval_secs: u64,
    /// Failed push reconnects tolerated before falling back to polling.
    /// `None` keeps retrying forever.
    pub push_max_retries: Option<u32>,
    /// First push reconnect delay; doubles per attempt.
    pub push_retry_delay: Duration,
    /// Delay between `/api/config` attempts while the server is unreachable.
    pub config_retry_delay: Duration,
    /// How many times to retry `/api/config` before `connect` fails.
    pub config_retries: u32,
}

impl ControllerConfig {
    /// Config for `url` with the stock tuning.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            push_enabled: true,
            poll_interval_secs: 5,
            push_max_retries: Some(5),
            push_retry_delay: Duration::from_secs(1),
            config_retry_delay: crate::controller::CONFIG_RETRY_DELAY,
            config_retries: 3,
        }
    }
}

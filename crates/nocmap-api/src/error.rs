use thiserror::Error;

/// Top-level error type for the `nocmap-api` crate.
///
/// Covers every failure mode across the dashboard, admin and push surfaces.
/// `nocmap-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the session is no longer valid.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake, certificate or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response. `message` comes from the `{"error": "..."}` body
    /// when the server sent one.
    #[error("Server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// `/api/config` answered but one of the required maps was missing.
    #[error("Server configuration is incomplete: missing {missing}")]
    IncompleteConfig { missing: &'static str },

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection or handshake failed.
    #[error("Push channel connection failed: {0}")]
    PushConnect(String),

    /// Malformed Engine.IO / Socket.IO frame.
    #[error("Malformed push frame: {0}")]
    PushFrame(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the admin session has expired
    /// and logging in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Api { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::PushConnect(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}

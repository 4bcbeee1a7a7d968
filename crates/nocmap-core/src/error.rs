// ── Core error types ──
//
// User-facing errors from nocmap-core. Consumers never see raw HTTP
// status codes or JSON parse failures; the `From<nocmap_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to NOC server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected to the NOC server")]
    Disconnected,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Floor not found: {floor}")]
    FloorNotFound { floor: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Server rejected the request: {message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nocmap_api::Error> for CoreError {
    fn from(err: nocmap_api::Error) -> Self {
        match err {
            nocmap_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nocmap_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nocmap_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            nocmap_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            nocmap_api::Error::Api { status: 401, message } => {
                CoreError::AuthenticationFailed { message }
            }
            nocmap_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            nocmap_api::Error::IncompleteConfig { missing } => CoreError::Config {
                message: format!("server returned an incomplete floor configuration (missing {missing})"),
            },
            nocmap_api::Error::PushConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("push channel failed: {reason}"),
            },
            nocmap_api::Error::PushFrame(reason) => {
                CoreError::Internal(format!("malformed push frame: {reason}"))
            }
            nocmap_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_status() {
        let err: CoreError = nocmap_api::Error::Api {
            status: 404,
            message: "Device tidak ditemukan".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
    }

    #[test]
    fn unauthorized_maps_to_auth_failure() {
        let err: CoreError = nocmap_api::Error::Api {
            status: 401,
            message: "no session".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}

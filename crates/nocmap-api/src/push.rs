//! Push channel with auto-reconnect.
//!
//! Connects to the server's Socket.IO endpoint over a plain WebSocket,
//! answers heartbeats, and broadcasts every `update_data` snapshot through
//! a [`tokio::sync::broadcast`] channel. Reconnects with exponential
//! backoff + jitter when the connection drops.
//!
//! # Example
//!
//! ```rust,ignore
//! use nocmap_api::push::{PushHandle, PushEvent, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let handle = PushHandle::connect(&base_url, ReconnectConfig::default(), cancel.clone(), None)?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     if let PushEvent::Snapshot(status) = event {
//!         println!("{} devices", status.devices.len());
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::ApiStatus;
use crate::socketio::{self, Packet};

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Socket.IO event carrying a full status snapshot.
pub const UPDATE_EVENT: &str = "update_data";

// ── PushEvent ────────────────────────────────────────────────────────

/// What the push task reports to subscribers.
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// Namespace connect acknowledged by the server.
    Connected,
    /// A full replacement snapshot.
    Snapshot(Arc<ApiStatus>),
    /// The connection dropped; a reconnect is pending unless cancelled.
    Disconnected,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for push reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push connection.
pub struct PushHandle {
    event_rx: broadcast::Receiver<PushEvent>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl PushHandle {
    /// Spawn the connect/reconnect loop for the server at `base_url`.
    ///
    /// Returns once the task is spawned; the first connection attempt
    /// happens asynchronously. `cookie` is sent on the upgrade request.
    pub fn connect(
        base_url: &Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        cookie: Option<String>,
    ) -> Result<Self, Error> {
        let ws_url = push_url(base_url)?;
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            push_loop(ws_url, event_tx, reconnect, task_cancel, cookie).await;
        });

        Ok(Self {
            event_rx,
            cancel,
            task,
        })
    }

    /// Get a new receiver. Slow consumers see `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.event_rx.resubscribe()
    }

    /// Signal shutdown and wait for the task to finish.
    pub async fn join(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Derive the WebSocket URL (`ws[s]://host/socket.io/?EIO=4&transport=websocket`).
pub fn push_url(base_url: &Url) -> Result<Url, Error> {
    let mut url = base_url.join(socketio::HANDSHAKE_PATH)?;
    let scheme = match base_url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::PushConnect(format!("cannot use {scheme} for {base_url}")))?;
    Ok(url)
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → backoff → reconnect.
///
/// Every lost connection waits out the backoff, clean closes included.
/// The attempt counter only resets once the server acknowledged the
/// namespace, so a server that accepts the upgrade and hangs up straight
/// away still exhausts `max_retries`.
async fn push_loop(
    ws_url: Url,
    event_tx: broadcast::Sender<PushEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    cookie: Option<String>,
) {
    let mut attempt: u32 = 0;

    loop {
        let mut acknowledged = false;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(
                &ws_url, &event_tx, &cancel, cookie.as_deref(), &mut acknowledged,
            ) => result,
        };
        let _ = event_tx.send(PushEvent::Disconnected);

        if cancel.is_cancelled() {
            break;
        }

        if acknowledged {
            attempt = 0;
        }
        match result {
            Ok(()) => tracing::info!(attempt, "push channel closed by server"),
            Err(e) => tracing::warn!(error = %e, attempt, "push channel error"),
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "push reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<PushEvent>,
    cancel: &CancellationToken,
    cookie: Option<&str>,
    acknowledged: &mut bool,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::PushConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(cookie_val) = cookie {
        request = request.with_header("Cookie", cookie_val);
    }

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::PushConnect(e.to_string()))?;

    tracing::info!("push websocket open");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(Message::text("41")).await;
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match handle_frame(&text, event_tx)? {
                            FrameAction::Reply(reply) => {
                                write
                                    .send(Message::text(reply))
                                    .await
                                    .map_err(|e| Error::PushConnect(e.to_string()))?;
                            }
                            FrameAction::Acknowledged => *acknowledged = true,
                            FrameAction::Close => return Ok(()),
                            FrameAction::Continue => {}
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "close frame received");
                        } else {
                            tracing::info!("close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(Error::PushConnect(e.to_string())),
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(());
                    }
                    // Binary, websocket-level ping/pong, raw frames
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Frame handling ───────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum FrameAction {
    Reply(&'static str),
    /// Namespace connect acknowledged.
    Acknowledged,
    Close,
    Continue,
}

/// Decode one text frame, broadcast what subscribers care about, and
/// tell the connection loop how to respond.
///
/// Malformed frames and undecodable snapshots are logged and skipped;
/// only a namespace refusal is fatal to the connection.
fn handle_frame(text: &str, event_tx: &broadcast::Sender<PushEvent>) -> Result<FrameAction, Error> {
    let packet = match Packet::decode(text) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::debug!(error = %e, "skipping push frame");
            return Ok(FrameAction::Continue);
        }
    };

    match packet {
        Packet::Open(info) => {
            tracing::debug!(sid = %info.sid, ping_interval = info.ping_interval, "engine.io open");
            Ok(FrameAction::Reply(socketio::CONNECT))
        }
        Packet::Ping => Ok(FrameAction::Reply(socketio::PONG)),
        Packet::Connect => {
            tracing::info!("push namespace connected");
            let _ = event_tx.send(PushEvent::Connected);
            Ok(FrameAction::Acknowledged)
        }
        Packet::Close | Packet::Disconnect => Ok(FrameAction::Close),
        Packet::ConnectError(message) => Err(Error::PushConnect(message)),
        Packet::Event { name, args } if name == UPDATE_EVENT => {
            let Some(payload) = args.into_iter().next() else {
                tracing::debug!("update_data without payload");
                return Ok(FrameAction::Continue);
            };
            match serde_json::from_value::<ApiStatus>(payload) {
                Ok(status) => {
                    tracing::trace!(devices = status.devices.len(), "snapshot received");
                    let _ = event_tx.send(PushEvent::Snapshot(Arc::new(status)));
                }
                Err(e) => tracing::warn!(error = %e, "undecodable update_data payload"),
            }
            Ok(FrameAction::Continue)
        }
        Packet::Event { name, .. } => {
            tracing::trace!(event = %name, "ignoring push event");
            Ok(FrameAction::Continue)
        }
        Packet::Pong | Packet::Noop => Ok(FrameAction::Continue),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`, jitter within +-25%.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

// ── Controller abstraction ──
//
// Full lifecycle management for a NOC server connection.
// Loads the floor configuration, optionally logs in, keeps the DataStore
// fed from the push channel (or by polling) and routes admin commands.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nocmap_api::transport::{TlsMode, TransportConfig};
use nocmap_api::{ApiStatus, NocClient, PushEvent, PushHandle, ReconnectConfig};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    AdminDevice, HealthResponse, LogBuffer, LogEntry, SiteConfig, StatusSnapshot,
};
use crate::store::DataStore;
use crate::stream::SnapshotStream;

/// Fixed delay between `/api/config` attempts.
pub const CONFIG_RETRY_DELAY: Duration = Duration::from_secs(2);

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Live: push connected, or polling on schedule.
    Connected,
    /// Push dropped; the backoff loop is trying again.
    Reconnecting { attempt: u32 },
    /// Push gave up; snapshots now come from polling.
    Polling,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    client: Mutex<Option<NocClient>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to load config and start background tasks.
    pub fn new(config: ControllerConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the server.
    ///
    /// Loads the floor configuration (retrying on a fixed delay), logs in
    /// when credentials are configured, performs an initial status fetch
    /// and spawns the background tasks.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let config = &self.inner.config;
        let transport = build_transport(config);
        let client = NocClient::new(config.url.clone(), &transport)?;

        let site = match self.load_config(&client).await {
            Ok(site) => site,
            Err(e) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e);
            }
        };
        debug!(
            floors = site.floors.len(),
            types = site.device_types.len(),
            "floor configuration loaded"
        );
        self.inner.store.set_config(site);

        if let Some(creds) = &config.credentials {
            if let Err(e) = client.login(&creds.username, &creds.password).await {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
            debug!(username = %creds.username, "admin session established");
        }

        *self.inner.client.lock().await = Some(client);

        if let Err(e) = self.refresh_status().await {
            warn!(error = %e, "initial status fetch failed");
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        if config.push_enabled {
            let ctrl = self.clone();
            handles.push(tokio::spawn(push_task(ctrl)));
        } else if config.poll_interval_secs > 0 {
            let ctrl = self.clone();
            handles.push(tokio::spawn(poll_task(ctrl)));
        }
        drop(handles);

        info!(url = %config.url, "connected to NOC server");
        Ok(())
    }

    /// Disconnect from the server.
    ///
    /// Cancels and joins background tasks, logs out if an admin session was
    /// opened, and resets the state to [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Some(client) = self.inner.client.lock().await.take() {
            if self.inner.config.credentials.is_some() {
                if let Err(e) = client.logout().await {
                    warn!(error = %e, "logout failed (non-fatal)");
                }
            }
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    async fn load_config(&self, client: &NocClient) -> Result<SiteConfig, CoreError> {
        let config = &self.inner.config;
        let mut attempt: u32 = 0;
        loop {
            match client.get_config().await {
                Ok(api) => return Ok(SiteConfig::from(api)),
                Err(e) if attempt < config.config_retries => {
                    attempt += 1;
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = u64::try_from(config.config_retry_delay.as_millis()).unwrap_or(u64::MAX),
                        "failed to load floor configuration, retrying"
                    );
                    tokio::select! {
                        biased;
                        () = self.inner.cancel.cancelled() => return Err(CoreError::Disconnected),
                        () = tokio::time::sleep(config.config_retry_delay) => {}
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn client(&self) -> Result<NocClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    // ── Data access ──────────────────────────────────────────────

    /// Fetch `/api/status` and `/api/logs`, replace the stored snapshot and
    /// return it. A failed log fetch keeps the previous log.
    pub async fn refresh_status(&self) -> Result<Arc<StatusSnapshot>, CoreError> {
        let client = self.client().await?;
        let (status, logs) = tokio::join!(client.get_status(), client.get_logs());

        let mut snapshot = StatusSnapshot::from(status?);
        match logs {
            Ok(logs) => {
                snapshot.logs =
                    LogBuffer::from_newest_first(logs.into_iter().map(LogEntry::from).collect())
                        .into_vec();
            }
            Err(e) => {
                warn!(error = %e, "log fetch failed, keeping previous entries");
                snapshot.logs.clone_from(&self.inner.store.snapshot().logs);
            }
        }

        let snapshot = Arc::new(snapshot);
        self.inner.store.apply_snapshot(Arc::clone(&snapshot));
        debug!(
            devices = snapshot.devices.len(),
            online = snapshot.global.online,
            "status refresh complete"
        );
        Ok(snapshot)
    }

    pub async fn logs(&self) -> Result<Vec<LogEntry>, CoreError> {
        let client = self.client().await?;
        let logs = client.get_logs().await?;
        Ok(LogBuffer::from_newest_first(logs.into_iter().map(LogEntry::from).collect()).into_vec())
    }

    pub async fn health(&self) -> Result<HealthResponse, CoreError> {
        let client = self.client().await?;
        Ok(client.health().await?)
    }

    // ── Admin API ────────────────────────────────────────────────

    pub async fn list_admin_devices(&self) -> Result<Vec<AdminDevice>, CoreError> {
        self.require_credentials()?;
        let client = self.client().await?;
        Ok(client.list_devices().await?)
    }

    pub async fn get_admin_device(&self, id: i64) -> Result<AdminDevice, CoreError> {
        self.require_credentials()?;
        let client = self.client().await?;
        client.get_device(id).await.map_err(|e| not_found_as_device(e, id))
    }

    /// Execute an admin command.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if matches!(
            *self.inner.connection_state.borrow(),
            ConnectionState::Disconnected | ConnectionState::Connecting | ConnectionState::Failed
        ) {
            return Err(CoreError::Disconnected);
        }
        self.require_credentials()?;
        cmd.validate()?;

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    fn require_credentials(&self) -> Result<(), CoreError> {
        if self.inner.config.credentials.is_none() {
            return Err(CoreError::AuthenticationFailed {
                message: "admin credentials are not configured".into(),
            });
        }
        Ok(())
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Push and polling are disabled since the CLI only needs a single
    /// request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.push_enabled = false;
        cfg.poll_interval_secs = 0;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn site_config(&self) -> Option<Arc<SiteConfig>> {
        self.inner.store.config()
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.inner.store.snapshot()
    }

    pub fn snapshots(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Follow the push channel, falling back to polling once it gives up.
async fn push_task(controller: Controller) {
    let inner = &controller.inner;
    let cancel = inner.cancel.clone();

    let cookie = match inner.client.lock().await.as_ref() {
        Some(client) => client.cookie_header(),
        None => None,
    };
    let reconnect = ReconnectConfig {
        initial_delay: inner.config.push_retry_delay,
        max_retries: inner.config.push_max_retries,
        ..ReconnectConfig::default()
    };
    let handle = match PushHandle::connect(
        &inner.config.url,
        reconnect,
        cancel.child_token(),
        cookie,
    ) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "push channel unavailable, polling instead");
            poll_task(controller).await;
            return;
        }
    };

    let mut rx = handle.subscribe();
    let mut attempt: u32 = 0;
    let mut gave_up = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Ok(PushEvent::Connected) => {
                    attempt = 0;
                    inner.connection_state.send_replace(ConnectionState::Connected);
                }
                Ok(PushEvent::Snapshot(status)) => {
                    apply_push_snapshot(&inner.store, Arc::unwrap_or_clone(status));
                }
                Ok(PushEvent::Disconnected) => {
                    attempt += 1;
                    inner
                        .connection_state
                        .send_replace(ConnectionState::Reconnecting { attempt });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "push consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    gave_up = true;
                    break;
                }
            }
        }
    }

    handle.join().await;

    if gave_up && !cancel.is_cancelled() {
        warn!("push channel gave up, polling instead");
        inner.connection_state.send_replace(ConnectionState::Polling);
        poll_task(controller).await;
    }
}

/// A push snapshot without logs keeps the previous log.
fn apply_push_snapshot(store: &DataStore, status: ApiStatus) {
    let has_logs = status.logs.is_some();
    let mut snapshot = StatusSnapshot::from(status);
    if !has_logs {
        snapshot.logs.clone_from(&store.snapshot().logs);
    }
    store.apply_snapshot(snapshot);
}

/// Periodically refresh status and logs.
async fn poll_task(controller: Controller) {
    let secs = controller.inner.config.poll_interval_secs;
    if secs == 0 {
        return;
    }
    let cancel = controller.inner.cancel.clone();
    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.refresh_status().await {
                    warn!(error = %e, "periodic status refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to the admin API.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;

    match cmd {
        Command::CreateDevice { draft } => {
            let resp = client.create_device(&draft).await?;
            info!(name = %draft.name, id = ?resp.id, "device created");
            Ok(resp
                .id
                .map_or(CommandResult::Ok, |id| CommandResult::Created { id }))
        }
        Command::UpdateDevice { id, draft } => {
            client
                .update_device(id, &draft)
                .await
                .map_err(|e| not_found_as_device(e, id))?;
            info!(id, "device updated");
            Ok(CommandResult::Ok)
        }
        Command::DeleteDevice { id } => {
            client
                .delete_device(id)
                .await
                .map_err(|e| not_found_as_device(e, id))?;
            info!(id, "device deleted");
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // NocClient::new adds one
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn not_found_as_device(err: nocmap_api::Error, id: i64) -> CoreError {
    if err.is_not_found() {
        CoreError::DeviceNotFound {
            identifier: id.to_string(),
        }
    } else {
        err.into()
    }
}

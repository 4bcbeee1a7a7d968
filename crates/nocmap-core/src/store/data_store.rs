// ── Central reactive data store ──
//
// Holds the site config and the latest status snapshot. Every update
// replaces the snapshot wholesale and is broadcast via `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::trace;

use crate::model::{SiteConfig, StatusSnapshot};
use crate::stream::SnapshotStream;

pub struct DataStore {
    pub(crate) config: watch::Sender<Option<Arc<SiteConfig>>>,
    pub(crate) snapshot: watch::Sender<Arc<StatusSnapshot>>,
    pub(crate) last_update: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (config, _) = watch::channel(None);
        let (snapshot, _) = watch::channel(Arc::new(StatusSnapshot::default()));
        let (last_update, _) = watch::channel(None);

        Self {
            config,
            snapshot,
            last_update,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub fn set_config(&self, config: SiteConfig) {
        self.config.send_replace(Some(Arc::new(config)));
    }

    /// Replace the snapshot and stamp the update time.
    pub fn apply_snapshot(&self, snapshot: impl Into<Arc<StatusSnapshot>>) {
        let snapshot = snapshot.into();
        trace!(devices = snapshot.devices.len(), "snapshot applied");
        self.snapshot.send_replace(snapshot);
        self.last_update.send_replace(Some(Utc::now()));
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> Option<Arc<SiteConfig>> {
        self.config.borrow().clone()
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.borrow()
    }

    /// How long ago the last snapshot arrived, or `None` if none has.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_update().map(|t| Utc::now() - t)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    pub fn subscribe_config(&self) -> watch::Receiver<Option<Arc<SiteConfig>>> {
        self.config.subscribe()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::GlobalStats;
    use futures_util::StreamExt;

    fn snapshot(total: u32) -> StatusSnapshot {
        StatusSnapshot {
            global: GlobalStats {
                total,
                online: total,
                offline: 0,
            },
            ..StatusSnapshot::default()
        }
    }

    #[test]
    fn starts_empty() {
        let store = DataStore::new();
        assert!(store.config().is_none());
        assert!(store.snapshot().devices.is_empty());
        assert!(store.last_update().is_none());
        assert!(store.data_age().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let store = DataStore::new();
        let mut stream = store.subscribe();
        assert_eq!(stream.current().global.total, 0);

        store.apply_snapshot(snapshot(3));
        let next = stream.changed().await.unwrap();
        assert_eq!(next.global.total, 3);
        assert_eq!(stream.current().global.total, 3);
        assert!(store.last_update().is_some());
    }

    #[tokio::test]
    async fn into_stream_yields_current_then_updates() {
        let store = DataStore::new();
        store.apply_snapshot(snapshot(1));
        let mut stream = store.subscribe().into_stream();
        assert_eq!(stream.next().await.unwrap().global.total, 1);

        store.apply_snapshot(snapshot(2));
        assert_eq!(stream.next().await.unwrap().global.total, 2);
    }

    #[test]
    fn config_replacement_is_visible() {
        let store = DataStore::new();
        let rx = store.subscribe_config();
        store.set_config(SiteConfig::default());
        assert!(rx.borrow().is_some());
        assert!(store.config().is_some());
    }
}

// ── Reactive snapshot streams ──
//
// Subscription types for consuming status updates from the DataStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::StatusSnapshot;

/// A subscription to the status snapshot.
///
/// Gives both the value seen at subscription time and every later
/// replacement, via [`changed`](Self::changed) or as a `Stream`.
pub struct SnapshotStream {
    current: Arc<StatusSnapshot>,
    receiver: watch::Receiver<Arc<StatusSnapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<StatusSnapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &Arc<StatusSnapshot> {
        &self.current
    }

    /// Latest snapshot in the store.
    pub fn latest(&self) -> Arc<StatusSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<StatusSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each snapshot, starting with the current one.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<StatusSnapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<StatusSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

//! Data bridge — connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: connects, pushes the floor configuration and
//! the first snapshot, then forwards every snapshot replacement and
//! connection-state transition as an [`Action`] until cancelled.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use nocmap_core::{ConnectionState, Controller};

use crate::action::{Action, Notification};

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let connected = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = controller.connect() => Some(result),
    };
    match connected {
        None => {
            controller.disconnect().await;
            return;
        }
        Some(Err(e)) => {
            warn!(error = %e, "failed to connect to NOC server");
            let _ = action_tx.send(Action::Disconnected(e.to_string()));
            let _ = action_tx.send(Action::Notify(Notification::error(e.to_string())));
            return;
        }
        Some(Ok(())) => {
            let _ = action_tx.send(Action::Connected);
        }
    }

    let mut snapshots = controller.snapshots();
    let mut site = controller.store().subscribe_config();
    let mut conn_state = controller.connection_state();

    if let Some(config) = site.borrow_and_update().clone() {
        let _ = action_tx.send(Action::SiteConfigLoaded(config));
    }
    let _ = action_tx.send(Action::SnapshotUpdated(snapshots.current().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = snapshots.changed() => {
                debug!(devices = snapshot.devices.len(), "dispatching SnapshotUpdated");
                let _ = action_tx.send(Action::SnapshotUpdated(snapshot));
            }
            Ok(()) = site.changed() => {
                if let Some(config) = site.borrow_and_update().clone() {
                    let _ = action_tx.send(Action::SiteConfigLoaded(config));
                }
            }
            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                if let Some(action) = state_action(&state) {
                    let _ = action_tx.send(action);
                }
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}

/// Status-bar action for a connection-state transition.
fn state_action(state: &ConnectionState) -> Option<Action> {
    match state {
        ConnectionState::Connected => Some(Action::Connected),
        ConnectionState::Disconnected => Some(Action::Disconnected("disconnected".into())),
        ConnectionState::Reconnecting { attempt } => Some(Action::Reconnecting(*attempt)),
        ConnectionState::Polling => Some(Action::Polling),
        ConnectionState::Failed => Some(Action::Disconnected("connection failed".into())),
        ConnectionState::Connecting => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_states_map_to_status_actions() {
        assert!(matches!(
            state_action(&ConnectionState::Reconnecting { attempt: 3 }),
            Some(Action::Reconnecting(3))
        ));
        assert!(matches!(
            state_action(&ConnectionState::Polling),
            Some(Action::Polling)
        ));
        assert!(matches!(
            state_action(&ConnectionState::Failed),
            Some(Action::Disconnected(_))
        ));
        assert!(state_action(&ConnectionState::Connecting).is_none());
    }
}

//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use nocmap_core::{DeviceId, SiteConfig, StatusSnapshot};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    EnterTvMode,
    ExitTvMode,
    /// Show a device on the map: its floor, with the detail popup open.
    LocateDevice(DeviceId),

    // ── Data (from the controller) ────────────────────────────────
    SiteConfigLoaded(Arc<SiteConfig>),
    SnapshotUpdated(Arc<StatusSnapshot>),

    // ── Connection status ─────────────────────────────────────────
    Connected,
    Disconnected(String),
    Reconnecting(u32),
    Polling,

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
}

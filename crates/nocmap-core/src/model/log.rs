// ── Activity log ──

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum number of entries kept client-side.
pub const LOG_CAPACITY: usize = 50;

/// Entries shown by default.
pub const LOG_DISPLAY_COUNT: usize = 10;

/// Server timestamp layout.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Colour class of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Online,
    Offline,
    Unstable,
    Unknown,
}

/// One status-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    /// Free text from the server, usually `"Online"` or `"Offline"`.
    pub status: String,
    pub device: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

impl LogEntry {
    pub fn level(&self) -> LogLevel {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "online" => LogLevel::Online,
            "offline" => LogLevel::Offline,
            "unstable" => LogLevel::Unstable,
            _ => LogLevel::Unknown,
        }
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// `HH:MM:SS` when the timestamp parses, the raw text otherwise.
    pub fn time_of_day(&self) -> String {
        self.parsed_timestamp()
            .map_or_else(|| self.timestamp.clone(), |t| t.format("%H:%M:%S").to_string())
    }
}

/// Newest-first log, bounded at [`LOG_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBuffer {
    entries: Vec<LogEntry>,
}

impl LogBuffer {
    /// Build from a newest-first list, dropping anything past capacity.
    pub fn from_newest_first(mut entries: Vec<LogEntry>) -> Self {
        entries.truncate(LOG_CAPACITY);
        Self { entries }
    }

    /// Record a new event at the front, evicting the oldest when full.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// The `n` most recent entries.
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<LogEntry> {
        self.entries
    }
}

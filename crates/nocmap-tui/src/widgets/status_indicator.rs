//! Device status dot: ● online, ○ offline, ◐ unstable.

use ratatui::style::Style;
use ratatui::text::Span;

use nocmap_core::DeviceStatus;

use crate::theme;

pub fn status_char(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Online => "●",
        DeviceStatus::Offline => "○",
        DeviceStatus::Unstable => "◐",
    }
}

pub fn status_span(status: DeviceStatus) -> Span<'static> {
    Span::styled(
        status_char(status),
        Style::default().fg(theme::status_color(status)),
    )
}

/// Dot followed by the status word, e.g. `● online`.
pub fn status_label(status: DeviceStatus) -> Span<'static> {
    Span::styled(
        format!("{} {status}", status_char(status)),
        Style::default().fg(theme::status_color(status)),
    )
}

//! Activity log screen: the full client-side log, newest first.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation,
    ScrollbarState, Table, TableState,
};

use nocmap_core::{LogEntry, StatusSnapshot};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const PAGE: usize = 10;

pub struct LogScreen {
    focused: bool,
    snapshot: Arc<StatusSnapshot>,
    selected: usize,
}

impl LogScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(StatusSnapshot::default()),
            selected: 0,
        }
    }

    fn entries(&self) -> &[LogEntry] {
        &self.snapshot.logs
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.entries().len().saturating_sub(1));
    }
}

impl Component for LogScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.select(self.selected.saturating_add(1)),
            KeyCode::Up | KeyCode::Char('k') => self.select(self.selected.saturating_sub(1)),
            KeyCode::PageDown => self.select(self.selected.saturating_add(PAGE)),
            KeyCode::PageUp => self.select(self.selected.saturating_sub(PAGE)),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            // New entries arrive at the top; stay on the newest unless scrolled.
            let scrolled = self.selected > 0;
            let added = snapshot.logs.len().saturating_sub(self.entries().len());
            self.snapshot = snapshot.clone();
            let target = if scrolled { self.selected + added } else { 0 };
            self.select(target);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let entries = self.entries();
        let block = Block::default()
            .title(format!(" Activity Log ({}) ", entries.len()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [table_area, hint_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No activity recorded yet", theme::key_hint())),
                table_area,
            );
        } else {
            let rows: Vec<Row> = entries
                .iter()
                .map(|entry| {
                    let color = theme::log_color(entry.level());
                    Row::new(vec![
                        Cell::from(entry.time_of_day()),
                        Cell::from(Span::styled(entry.status.clone(), Style::default().fg(color))),
                        Cell::from(entry.device.clone().unwrap_or_default()),
                        Cell::from(entry.message.clone()),
                    ])
                    .style(theme::table_row())
                })
                .collect();
            let table = Table::new(
                rows,
                [
                    Constraint::Length(9),
                    Constraint::Length(9),
                    Constraint::Length(20),
                    Constraint::Min(20),
                ],
            )
            .header(Row::new(vec!["Time", "Status", "Device", "Message"]).style(theme::table_header()))
            .row_highlight_style(theme::table_selected());

            let mut state = TableState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(table, table_area, &mut state);

            let mut scroll = ScrollbarState::new(entries.len()).position(self.selected);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                table_area,
                &mut scroll,
            );
        }

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("scroll  ", theme::key_hint()),
            Span::styled("PgUp/PgDn ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("g/G ", theme::key_hint_key()),
            Span::styled("newest/oldest", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hint_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Log"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{render_to_string, snapshot};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn with_new_entry(base: &StatusSnapshot) -> Arc<StatusSnapshot> {
        let mut next = base.clone();
        next.logs.insert(
            0,
            LogEntry {
                timestamp: "2024-05-01 08:05:00".into(),
                message: "AP Lab unstable".into(),
                status: "Unstable".into(),
                device: Some("AP Lab".into()),
                device_type: Some("switch".into()),
            },
        );
        Arc::new(next)
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut screen = LogScreen::new();
        screen.update(&Action::SnapshotUpdated(snapshot())).unwrap();

        screen.handle_key_event(key(KeyCode::PageDown)).unwrap();
        assert_eq!(screen.selected, 1);
        screen.handle_key_event(key(KeyCode::Up)).unwrap();
        screen.handle_key_event(key(KeyCode::Up)).unwrap();
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn new_entries_keep_scrolled_position() {
        let base = snapshot();
        let mut screen = LogScreen::new();
        screen.update(&Action::SnapshotUpdated(base.clone())).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();

        screen
            .update(&Action::SnapshotUpdated(with_new_entry(&base)))
            .unwrap();
        assert_eq!(screen.selected, 2);
        assert_eq!(screen.entries()[screen.selected].message, "Core Switch online");
    }

    #[test]
    fn new_entries_follow_top_when_not_scrolled() {
        let base = snapshot();
        let mut screen = LogScreen::new();
        screen.update(&Action::SnapshotUpdated(base.clone())).unwrap();
        screen
            .update(&Action::SnapshotUpdated(with_new_entry(&base)))
            .unwrap();
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn render_shows_time_and_device() {
        let mut screen = LogScreen::new();
        screen.update(&Action::SnapshotUpdated(snapshot())).unwrap();
        let text = render_to_string(&screen, 90, 8);
        assert!(text.contains("Activity Log (2)"), "{text}");
        assert!(text.contains("07:59:00"));
        assert!(text.contains("CCTV Lobby offline"));
    }

    #[test]
    fn empty_log_has_placeholder() {
        let screen = LogScreen::new();
        let text = render_to_string(&screen, 60, 6);
        assert!(text.contains("No activity recorded yet"), "{text}");
    }
}

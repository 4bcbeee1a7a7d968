//! Devices screen — every monitored device in one table, offline first.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use nocmap_core::aggregate::{self, StatusBucket};
use nocmap_core::{Device, SiteConfig, StatusSnapshot};

use crate::action::Action;
use crate::component::Component;
use crate::screens::map::next_type_filter;
use crate::theme;
use crate::widgets::status_indicator::status_label;

pub struct DevicesScreen {
    focused: bool,
    config: Option<Arc<SiteConfig>>,
    snapshot: Arc<StatusSnapshot>,
    bucket: StatusBucket,
    type_filter: Option<String>,
    selected: usize,
}

impl DevicesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            config: None,
            snapshot: Arc::new(StatusSnapshot::default()),
            bucket: StatusBucket::Total,
            type_filter: None,
            selected: 0,
        }
    }

    fn rows(&self) -> Vec<&Device> {
        aggregate::device_list(&self.snapshot.devices, self.bucket, self.type_filter.as_deref())
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn cycle_type_filter(&mut self) {
        let types: Vec<String> = self
            .config
            .as_deref()
            .map(|c| c.device_types.keys().cloned().collect())
            .unwrap_or_default();
        self.type_filter = next_type_filter(&types, self.type_filter.as_deref());
        self.selected = 0;
    }
}

impl Component for DevicesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('G') => {
                self.selected = usize::MAX;
                self.clamp_selection();
            }
            KeyCode::Char('a') => self.bucket = StatusBucket::Total,
            KeyCode::Char('o') => self.bucket = StatusBucket::Online,
            KeyCode::Char('x') => self.bucket = StatusBucket::Offline,
            KeyCode::Char('f') => self.cycle_type_filter(),
            KeyCode::Enter => {
                return Ok(self
                    .rows()
                    .get(self.selected)
                    .map(|d| Action::LocateDevice(d.id.clone())));
            }
            _ => {}
        }
        self.clamp_selection();
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SiteConfigLoaded(config) => self.config = Some(config.clone()),
            Action::SnapshotUpdated(snapshot) => {
                self.snapshot = snapshot.clone();
                self.clamp_selection();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let devices = self.rows();
        let config = self.config.as_deref();
        let type_part = match (&self.type_filter, config) {
            (Some(t), Some(c)) => format!(" · {}", c.type_label(t)),
            (Some(t), None) => format!(" · {t}"),
            (None, _) => String::new(),
        };
        let block = Block::default()
            .title(format!(" {}{type_part} ({}) ", self.bucket.title(), devices.len()))
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

        let rows: Vec<Row> = devices
            .iter()
            .map(|d| {
                let (type_label, floor_label) = config.map_or(
                    (d.device_type.as_str(), d.floor_id.as_str()),
                    |c| (c.type_label(&d.device_type), c.floor_label(&d.floor_id)),
                );
                Row::new(vec![
                    Cell::from(status_label(d.status)),
                    Cell::from(d.name.clone()),
                    Cell::from(d.ip.clone()),
                    Cell::from(type_label.to_owned()),
                    Cell::from(floor_label.to_owned()),
                    Cell::from(format!(
                        "{:.1}% / {:.1}%",
                        d.position.top.value(),
                        d.position.left.value()
                    )),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Min(18),
                Constraint::Length(16),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(16),
            ],
        )
        .header(
            Row::new(vec!["Status", "Name", "IP", "Type", "Floor", "Top / Left"])
                .style(theme::table_header()),
        )
        .row_highlight_style(theme::table_selected());

        let mut state =
            TableState::default().with_selected((!devices.is_empty()).then_some(self.selected));
        frame.render_stateful_widget(table, table_area, &mut state);

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("a/o/x ", theme::key_hint_key()),
            Span::styled("all/online/offline  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("type  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("show on map", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hint_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Devices"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{render_to_string, site, snapshot};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use nocmap_core::DeviceId;
    use pretty_assertions::assert_eq;

    fn key(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn loaded() -> DevicesScreen {
        let mut screen = DevicesScreen::new();
        screen.update(&Action::SiteConfigLoaded(site())).unwrap();
        screen.update(&Action::SnapshotUpdated(snapshot())).unwrap();
        screen
    }

    fn names(screen: &DevicesScreen) -> Vec<&str> {
        screen.rows().iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn offline_devices_sort_first() {
        let screen = loaded();
        assert_eq!(
            names(&screen),
            vec!["AP Lab", "CCTV Lobby", "Core Switch", "Lobby Cam"]
        );
    }

    #[test]
    fn bucket_and_type_keys_narrow_the_table() {
        let mut screen = loaded();
        screen.handle_key_event(key('o')).unwrap();
        assert_eq!(names(&screen), vec!["Core Switch", "Lobby Cam"]);

        screen.handle_key_event(key('f')).unwrap();
        assert_eq!(names(&screen), vec!["Core Switch"]);
        screen.handle_key_event(key('f')).unwrap();
        assert_eq!(names(&screen), vec!["Lobby Cam"]);
        screen.handle_key_event(key('f')).unwrap();
        assert_eq!(screen.type_filter, None);
    }

    #[test]
    fn selection_is_clamped_and_enter_locates() {
        let mut screen = loaded();
        for _ in 0..10 {
            screen.handle_key_event(key('j')).unwrap();
        }
        assert_eq!(screen.selected, 3);

        screen.handle_key_event(key('x')).unwrap();
        assert_eq!(screen.selected, 1);

        let action = screen
            .handle_key_event(KeyEvent {
                code: KeyCode::Enter,
                ..key(' ')
            })
            .unwrap();
        assert!(matches!(action, Some(Action::LocateDevice(id)) if id == DeviceId::from("10_0_0_9")));
    }

    #[test]
    fn render_lists_labels() {
        let screen = loaded();
        let text = render_to_string(&screen, 110, 10);
        assert!(text.contains("All Devices (4)"), "{text}");
        assert!(text.contains("Lantai 1"));
        assert!(text.contains("CCTV"));
    }
}

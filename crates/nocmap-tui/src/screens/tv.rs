//! TV mode: every floor at once, for a wall display.
//!
//! Each tile shows the floor's counts and a miniature map; tiles with any
//! device down get a red border. The header carries the building totals
//! and a clock refreshed from the tick stream while the screen is shown.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Local;
use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::Canvas;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use nocmap_core::render;
use nocmap_core::summary::{self, FloorSummary};
use nocmap_core::{SiteConfig, StatusSnapshot, ViewportTransform};

use crate::action::Action;
use crate::component::Component;
use crate::screens::map::paint_markers;
use crate::theme;

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Columns and rows for `n` tiles: as square as possible, wider than tall.
pub(crate) fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut cols = 1;
    while cols * cols < n {
        cols += 1;
    }
    (cols, n.div_ceil(cols))
}

pub struct TvScreen {
    focused: bool,
    config: Option<Arc<SiteConfig>>,
    snapshot: Arc<StatusSnapshot>,
    clock: String,
}

impl TvScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            config: None,
            snapshot: Arc::new(StatusSnapshot::default()),
            clock: Local::now().format(CLOCK_FORMAT).to_string(),
        }
    }

    fn summaries(&self) -> Vec<FloorSummary> {
        self.config
            .as_deref()
            .map(|c| summary::floor_summaries(c, &self.snapshot.devices))
            .unwrap_or_default()
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let global = self.snapshot.global;
        let line = Line::from(vec![
            Span::styled(" NOC floor status ", theme::title_style()),
            Span::styled("│ ", theme::key_hint()),
            Span::styled(format!("Total {}  ", global.total), theme::table_row()),
            Span::styled(
                format!("● {}  ", global.online),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            Span::styled(
                format!("○ {}", global.offline),
                Style::default().fg(theme::ERROR_RED),
            ),
        ]);
        let [left, right] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(10)]).areas(area);
        frame.render_widget(Paragraph::new(line), left);
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.clock.clone(),
                theme::title_style().add_modifier(Modifier::BOLD),
            )),
            right,
        );
    }

    fn render_tile(&self, frame: &mut Frame, area: Rect, floor: &FloorSummary, all_types: &BTreeSet<String>) {
        let counts = Line::from(vec![
            Span::styled(format!(" Total {} ", floor.total), theme::table_row()),
            Span::styled(
                format!("● {} ", floor.online),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            Span::styled(
                format!("○ {} ", floor.offline),
                Style::default().fg(theme::ERROR_RED),
            ),
        ]);
        let block = Block::default()
            .title(format!(" {} ", floor.label))
            .title_style(theme::title_style())
            .title_bottom(counts)
            .borders(Borders::ALL)
            .border_type(if floor.critical {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(if floor.critical {
                theme::border_critical()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let markers = render::markers(&self.snapshot.devices, &floor.floor_id, all_types);
        let identity = ViewportTransform::default();
        let canvas = Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([0.0, f64::from(inner.width.saturating_sub(1))])
            .y_bounds([0.0, f64::from(inner.height.saturating_sub(1))])
            .paint(|ctx| paint_markers(ctx, inner, &markers, &identity, false));
        frame.render_widget(canvas, inner);
    }
}

impl Component for TvScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SiteConfigLoaded(config) => self.config = Some(config.clone()),
            Action::SnapshotUpdated(snapshot) => self.snapshot = snapshot.clone(),
            // The clock only advances while TV mode is on screen.
            Action::EnterTvMode => self.clock = Local::now().format(CLOCK_FORMAT).to_string(),
            Action::Tick if self.focused => {
                self.clock = Local::now().format(CLOCK_FORMAT).to_string();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [header, grid] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);
        self.render_header(frame, header);

        let floors = self.summaries();
        if floors.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  Waiting for floor configuration…", theme::key_hint())),
                grid,
            );
            return;
        }

        let all_types: BTreeSet<String> = self
            .config
            .as_deref()
            .map(|c| c.device_types.keys().cloned().collect())
            .unwrap_or_default();
        let (cols, rows) = grid_dims(floors.len());
        let row_areas = Layout::vertical(vec![Constraint::Fill(1); rows]).split(grid);
        for (r, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::horizontal(vec![Constraint::Fill(1); cols]).split(*row_area);
            for (c, cell) in cells.iter().enumerate() {
                if let Some(floor) = floors.get(r * cols + c) {
                    self.render_tile(frame, *cell, floor, &all_types);
                }
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "TV"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{render_to_string, site, snapshot};
    use pretty_assertions::assert_eq;

    #[test]
    fn grid_is_roughly_square() {
        assert_eq!(grid_dims(0), (0, 0));
        assert_eq!(grid_dims(1), (1, 1));
        assert_eq!(grid_dims(2), (2, 1));
        assert_eq!(grid_dims(4), (2, 2));
        assert_eq!(grid_dims(5), (3, 2));
        assert_eq!(grid_dims(9), (3, 3));
        assert_eq!(grid_dims(10), (4, 3));
    }

    #[test]
    fn tiles_show_every_floor_with_counts() {
        let mut screen = TvScreen::new();
        screen.update(&Action::SiteConfigLoaded(site())).unwrap();
        screen.update(&Action::SnapshotUpdated(snapshot())).unwrap();

        let text = render_to_string(&screen, 100, 20);
        assert!(text.contains("Ground Floor"), "{text}");
        assert!(text.contains("Lantai 1"));
        assert!(text.contains("Total 4"));
        assert!(text.contains("○ 2"));
    }

    #[test]
    fn critical_floor_gets_thick_border() {
        let mut screen = TvScreen::new();
        screen.update(&Action::SiteConfigLoaded(site())).unwrap();
        screen.update(&Action::SnapshotUpdated(snapshot())).unwrap();

        // Ground (left tile) is healthy, floor_1 (right tile) is not.
        let text = render_to_string(&screen, 100, 20);
        let tile_top = text.lines().nth(1).unwrap();
        assert!(tile_top.starts_with('╭'), "{tile_top}");
        assert!(tile_top.contains('┏'), "{tile_top}");
    }

    #[test]
    fn clock_ticks_only_while_focused() {
        let mut screen = TvScreen::new();
        screen.clock = "stale".into();
        screen.update(&Action::Tick).unwrap();
        assert_eq!(screen.clock, "stale");

        screen.set_focused(true);
        screen.update(&Action::Tick).unwrap();
        assert_ne!(screen.clock, "stale");
        assert_eq!(screen.clock.len(), 8);
    }
}

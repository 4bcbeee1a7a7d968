//! Floor map: one floor at a time, device markers on a pan/zoom canvas,
//! with a sidebar for counts, floors, type filters and recent events.

use std::cell::Cell;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Rectangle};
use ratatui::widgets::{Block, BorderType, Borders, Cell as TableCell, Paragraph, Row, Table};
use tracing::debug;

use nocmap_core::aggregate::StatusBucket;
use nocmap_core::render::{MapLayout, Marker};
use nocmap_core::{
    DashboardState, Device, DeviceId, LOG_DISPLAY_COUNT, Point, ViewportTransform, ZoomDirection,
    ZoomLimits,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::overlay;
use crate::widgets::status_indicator::{status_char, status_label, status_span};

/// Horizontal pan step in cells; vertical is half because cells are tall.
const PAN_STEP_X: f64 = 4.0;
const PAN_STEP_Y: f64 = 2.0;
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
/// How far (in cells) a click may land from a marker and still hit it.
const HIT_RADIUS: f64 = 1.5;
/// Device names are drawn next to markers from this zoom level up.
const LABEL_ZOOM: f64 = 2.0;
const SIDEBAR_WIDTH: u16 = 34;
const SIDEBAR_MIN_TOTAL: u16 = 80;

/// Content layout for a map drawn in `area`: 0 % lands on the first cell,
/// 100 % on the last.
pub(crate) fn map_layout(area: Rect) -> MapLayout {
    MapLayout::new(
        f64::from(area.width.saturating_sub(1)),
        f64::from(area.height.saturating_sub(1)),
    )
}

/// Draw `markers` on a canvas covering `area`. Canvas y grows upwards, so
/// rows are flipped.
pub(crate) fn paint_markers(
    ctx: &mut Context<'_>,
    area: Rect,
    markers: &[Marker],
    transform: &ViewportTransform,
    with_labels: bool,
) {
    let layout = map_layout(area);
    let top = f64::from(area.height.saturating_sub(1));
    for marker in markers {
        let Some((col, row)) =
            layout.project_cell(marker.position(), transform, area.width, area.height)
        else {
            continue;
        };
        let (x, y) = (f64::from(col), top - f64::from(row));
        let color = theme::status_color(marker.status);
        ctx.print(
            x,
            y,
            Span::styled(
                status_char(marker.status),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        );
        if with_labels {
            let label: String = marker.name.chars().take(16).collect();
            ctx.print(
                x + 2.0,
                y,
                Span::styled(label, Style::default().fg(theme::DIM_WHITE)),
            );
        }
    }
}

/// Outline of the floor image under `transform`.
fn paint_outline(ctx: &mut Context<'_>, area: Rect, transform: &ViewportTransform) {
    let layout = map_layout(area);
    let top = f64::from(area.height.saturating_sub(1));
    let from = transform.apply(Point::ORIGIN);
    let to = transform.apply(Point::new(layout.width, layout.height));
    ctx.draw(&Rectangle {
        x: from.x,
        y: top - to.y,
        width: to.x - from.x,
        height: to.y - from.y,
        color: theme::BORDER_GRAY,
    });
}

// ── Overlays ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct DeviceListView {
    bucket: StatusBucket,
    type_filter: Option<String>,
    selected: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Overlay {
    #[default]
    None,
    /// Detail popup for one device, looked up in the latest snapshot on
    /// every render.
    Detail(DeviceId),
    /// Aggregate device list for a status bucket.
    List(DeviceListView),
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    gesture: nocmap_core::viewport::PanGesture,
    start: Point,
    moved: bool,
}

// ── Screen ────────────────────────────────────────────────────────────

pub struct MapScreen {
    focused: bool,
    state: DashboardState,
    preferred_floor: Option<String>,
    filter_cursor: usize,
    overlay: Overlay,
    drag: Option<Drag>,
    last_click: Option<(Instant, Point)>,
    hovered: Option<DeviceId>,
    /// Canvas area from the last render, for mouse hit-testing.
    map_area: Cell<Rect>,
}

impl MapScreen {
    pub fn new(limits: ZoomLimits, preferred_floor: Option<String>) -> Self {
        Self {
            focused: false,
            state: DashboardState::new(limits),
            preferred_floor,
            filter_cursor: 0,
            overlay: Overlay::None,
            drag: None,
            last_click: None,
            hovered: None,
            map_area: Cell::new(Rect::default()),
        }
    }

    fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.state.devices().iter().find(|d| &d.id == id)
    }

    fn type_ids(&self) -> Vec<String> {
        self.state
            .config()
            .map(|c| c.device_types.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn list_devices(&self, view: &DeviceListView) -> Vec<&Device> {
        self.state
            .device_list(view.bucket, view.type_filter.as_deref())
    }

    fn open_list(&mut self, bucket: StatusBucket) {
        debug!(%bucket, "opening device list");
        self.overlay = Overlay::List(DeviceListView {
            bucket,
            type_filter: None,
            selected: 0,
        });
    }

    /// Jump to a device's floor and show its details.
    fn locate(&mut self, id: &DeviceId) {
        let Some(floor) = self.device(id).map(|d| d.floor_id.clone()) else {
            return;
        };
        if let Err(e) = self.state.switch_floor(&floor) {
            debug!(error = %e, "device floor not configured");
        }
        self.overlay = Overlay::Detail(id.clone());
    }

    fn zoom_at_centre(&mut self, direction: ZoomDirection) {
        let area = self.map_area.get();
        let centre = Point::new(f64::from(area.width) / 2.0, f64::from(area.height) / 2.0);
        self.state
            .viewport_mut()
            .zoom_at_screen(centre, direction);
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        self.state.viewport_mut().pan_by(Point::new(dx, dy));
    }

    /// Pointer position relative to the canvas, if inside it.
    fn pointer(&self, mouse: &MouseEvent) -> Option<Point> {
        let area = self.map_area.get();
        area.contains((mouse.column, mouse.row).into()).then(|| {
            Point::new(
                f64::from(mouse.column - area.x),
                f64::from(mouse.row - area.y),
            )
        })
    }

    /// Pointer position relative to the canvas origin, unclamped (drags may
    /// leave the canvas).
    fn raw_pointer(&self, mouse: &MouseEvent) -> Point {
        let area = self.map_area.get();
        Point::new(
            f64::from(mouse.column) - f64::from(area.x),
            f64::from(mouse.row) - f64::from(area.y),
        )
    }

    fn marker_at(&self, pointer: Point) -> Option<DeviceId> {
        let markers = self.state.markers();
        map_layout(self.map_area.get())
            .hit_test(&markers, self.state.viewport(), pointer, HIT_RADIUS)
            .map(|m| m.device_id.clone())
    }

    /// A press-and-release without movement. Two in quick succession reset
    /// the viewport; a single one on a marker opens its detail popup.
    fn click(&mut self, pointer: Point, now: Instant) {
        let double = self.last_click.is_some_and(|(at, p)| {
            now.saturating_duration_since(at) <= DOUBLE_CLICK && p.distance(pointer) <= 1.0
        });
        if double {
            self.last_click = None;
            self.overlay = Overlay::None;
            self.state.reset_viewport();
            return;
        }
        self.last_click = Some((now, pointer));
        if let Some(id) = self.marker_at(pointer) {
            self.overlay = Overlay::Detail(id);
        }
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Option<Action> {
        match std::mem::take(&mut self.overlay) {
            Overlay::None => {}
            Overlay::Detail(id) => {
                if !matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.overlay = Overlay::Detail(id);
                }
            }
            Overlay::List(mut view) => {
                let len = self.list_devices(&view).len();
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => return None,
                    KeyCode::Down | KeyCode::Char('j') => {
                        view.selected = (view.selected + 1).min(len.saturating_sub(1));
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        view.selected = view.selected.saturating_sub(1);
                    }
                    KeyCode::Tab | KeyCode::Char('f') => {
                        view.type_filter =
                            next_type_filter(&self.type_ids(), view.type_filter.as_deref());
                        view.selected = 0;
                    }
                    KeyCode::Char('a') => view.bucket = StatusBucket::Total,
                    KeyCode::Char('o') => view.bucket = StatusBucket::Online,
                    KeyCode::Char('x') => view.bucket = StatusBucket::Offline,
                    KeyCode::Enter => {
                        let target = self
                            .list_devices(&view)
                            .get(view.selected)
                            .map(|d| d.id.clone());
                        if let Some(id) = target {
                            self.locate(&id);
                            return None;
                        }
                    }
                    _ => {}
                }
                let len = self.list_devices(&view).len();
                view.selected = view.selected.min(len.saturating_sub(1));
                self.overlay = Overlay::List(view);
            }
        }
        None
    }

    fn render_map(&self, frame: &mut Frame, area: Rect) {
        let zoom_pct = self.state.viewport().zoom() * 100.0;
        let floor = self.state.current_floor_label();
        let title = if floor.is_empty() {
            " Floor map ".to_owned()
        } else {
            format!(" {floor}  ·  Zoom {zoom_pct:.0}% ")
        };
        let block = Block::default()
            .title(title)
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

        let [canvas_area, hint_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        self.map_area.set(canvas_area);

        if self.state.config().is_none() {
            frame.render_widget(
                Paragraph::new(Span::styled("  Loading floor configuration…", theme::key_hint())),
                canvas_area,
            );
        } else {
            let markers = self.state.markers();
            let transform = *self.state.viewport();
            let labels = transform.zoom() >= LABEL_ZOOM;
            let canvas = Canvas::default()
                .marker(symbols::Marker::Braille)
                .x_bounds([0.0, f64::from(canvas_area.width.saturating_sub(1))])
                .y_bounds([0.0, f64::from(canvas_area.height.saturating_sub(1))])
                .paint(|ctx| {
                    paint_outline(ctx, canvas_area, &transform);
                    ctx.layer();
                    paint_markers(ctx, canvas_area, &markers, &transform, labels);
                });
            frame.render_widget(canvas, canvas_area);
        }

        frame.render_widget(Paragraph::new(self.hint_line()), hint_area);
    }

    /// Hovered device as a tooltip line, else key hints.
    fn hint_line(&self) -> Line<'_> {
        if let Some(device) = self.hovered.as_ref().and_then(|id| self.device(id)) {
            let type_label = self
                .state
                .config()
                .map_or(device.device_type.as_str(), |c| c.type_label(&device.device_type));
            return Line::from(vec![
                Span::raw(" "),
                status_span(device.status),
                Span::styled(format!(" {}", device.name), theme::title_style()),
                Span::styled(format!("  {}  {type_label}", device.ip), theme::table_row()),
            ]);
        }
        Line::from(vec![
            Span::styled(" [ ] ", theme::key_hint_key()),
            Span::styled("floor  ", theme::key_hint()),
            Span::styled("+/- ", theme::key_hint_key()),
            Span::styled("zoom  ", theme::key_hint()),
            Span::styled("←→↑↓ ", theme::key_hint_key()),
            Span::styled("pan  ", theme::key_hint()),
            Span::styled("0 ", theme::key_hint_key()),
            Span::styled("reset  ", theme::key_hint()),
            Span::styled("f/space ", theme::key_hint_key()),
            Span::styled("filter  ", theme::key_hint()),
            Span::styled("t ", theme::key_hint_key()),
            Span::styled("tv", theme::key_hint()),
        ])
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let type_count = u16::try_from(self.type_ids().len()).unwrap_or(u16::MAX);
        let floor_count = self
            .state
            .config()
            .map_or(0, |c| u16::try_from(c.floors.len()).unwrap_or(u16::MAX));
        let [stats_area, floors_area, filters_area, log_area] = Layout::vertical([
            Constraint::Length(6),
            Constraint::Length(floor_count.saturating_add(2)),
            Constraint::Length(type_count.saturating_add(2)),
            Constraint::Min(3),
        ])
        .areas(area);

        self.render_stats(frame, stats_area);
        self.render_floors(frame, floors_area);
        self.render_filters(frame, filters_area);
        self.render_recent(frame, log_area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let global = self.state.global();
        let stat = |key: &'static str, label: &'static str, value: u32, color| {
            Line::from(vec![
                Span::styled(format!(" {key} "), theme::key_hint_key()),
                Span::styled(format!("{label:<9}"), theme::table_row()),
                Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ])
        };
        let updated = self.state.snapshot().timestamp.as_deref().unwrap_or("-");
        let lines = vec![
            stat("a", "Total", global.total, theme::NEON_CYAN),
            stat("o", "Online", global.online, theme::SUCCESS_GREEN),
            stat("x", "Offline", global.offline, theme::ERROR_RED),
            Line::from(Span::styled(format!(" Updated {updated}"), theme::key_hint())),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(sidebar_block("Status")),
            area,
        );
    }

    fn render_floors(&self, frame: &mut Frame, area: Rect) {
        let current = self.state.current_floor();
        let lines: Vec<Line> = self
            .state
            .summaries()
            .into_iter()
            .map(|s| {
                let active = current == Some(s.floor_id.as_str());
                let style = if active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let counts_color = if s.critical {
                    theme::ERROR_RED
                } else {
                    theme::SUCCESS_GREEN
                };
                Line::from(vec![
                    Span::styled(if active { " ▶ " } else { "   " }, style),
                    Span::styled(format!("{:<18}", s.label), style),
                    Span::styled(format!("{}/{}", s.online, s.total), Style::default().fg(counts_color)),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(sidebar_block("Floors [ ]")),
            area,
        );
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let Some(config) = self.state.config() else {
            frame.render_widget(sidebar_block("Filters"), area);
            return;
        };
        let lines: Vec<Line> = config
            .device_types
            .values()
            .enumerate()
            .map(|(i, info)| {
                let checked = if self.state.is_filter_active(&info.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if i == self.filter_cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Line::from(Span::styled(format!(" {checked} {}", info.label), style))
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(sidebar_block("Filters f/space")),
            area,
        );
    }

    fn render_recent(&self, frame: &mut Frame, area: Rect) {
        let logs = self.state.logs();
        let lines: Vec<Line> = if logs.is_empty() {
            vec![Line::from(Span::styled(" No events yet…", theme::key_hint()))]
        } else {
            logs.iter()
                .take(LOG_DISPLAY_COUNT)
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(format!(" {} ", entry.time_of_day()), theme::key_hint()),
                        Span::styled(
                            entry.message.clone(),
                            Style::default().fg(theme::log_color(entry.level())),
                        ),
                    ])
                })
                .collect()
        };
        frame.render_widget(
            Paragraph::new(lines).block(sidebar_block("Recent events")),
            area,
        );
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, id: &DeviceId) {
        let popup = overlay::centered_rect(area, 52, 10);
        let Some(device) = self.device(id) else {
            let inner = overlay::render_frame(frame, popup, id.as_str(), theme::BORDER_GRAY);
            frame.render_widget(
                Paragraph::new(Span::styled("No longer reported by the server.", theme::key_hint())),
                inner,
            );
            return;
        };
        let inner = overlay::render_frame(
            frame,
            popup,
            &device.name,
            theme::status_color(device.status),
        );
        let (type_label, floor_label) = self.state.config().map_or(
            (device.device_type.as_str(), device.floor_id.as_str()),
            |c| (c.type_label(&device.device_type), c.floor_label(&device.floor_id)),
        );
        let row = |label: &'static str, value: Span<'static>| {
            Line::from(vec![Span::styled(format!(" {label:<10}"), theme::key_hint()), value])
        };
        let text = |s: String| Span::styled(s, theme::table_row());
        let lines = vec![
            row("IP", text(device.ip.clone())),
            row("Type", text(type_label.to_owned())),
            row("Floor", text(floor_label.to_owned())),
            row("Status", status_label(device.status)),
            row(
                "Position",
                text(format!(
                    "top {:.2}%  left {:.2}%",
                    device.position.top.value(),
                    device.position.left.value()
                )),
            ),
            row("Id", text(device.id.to_string())),
            Line::default(),
            Line::from(vec![
                Span::styled(" Esc ", theme::key_hint_key()),
                Span::styled("close", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, view: &DeviceListView) {
        let devices = self.list_devices(view);
        let config = self.state.config();
        let title = match (&view.type_filter, config) {
            (Some(t), Some(c)) => format!("{} · {} ({})", view.bucket.title(), c.type_label(t), devices.len()),
            (Some(t), None) => format!("{} · {t} ({})", view.bucket.title(), devices.len()),
            (None, _) => format!("{} ({})", view.bucket.title(), devices.len()),
        };
        let popup = overlay::centered_rect(area, 90, 24);
        let inner = overlay::render_frame(frame, popup, &title, theme::ELECTRIC_PURPLE);
        let [table_area, hint_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if devices.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" No devices in this list.", theme::key_hint())),
                table_area,
            );
        } else {
            let rows: Vec<Row> = devices
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let (type_label, floor_label) = config.map_or(
                        (d.device_type.as_str(), d.floor_id.as_str()),
                        |c| (c.type_label(&d.device_type), c.floor_label(&d.floor_id)),
                    );
                    Row::new(vec![
                        TableCell::from(status_span(d.status)),
                        TableCell::from(d.name.clone()),
                        TableCell::from(d.ip.clone()),
                        TableCell::from(type_label.to_owned()),
                        TableCell::from(floor_label.to_owned()),
                    ])
                    .style(if i == view.selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    })
                })
                .collect();
            let table = Table::new(
                rows,
                [
                    Constraint::Length(2),
                    Constraint::Min(16),
                    Constraint::Length(16),
                    Constraint::Length(12),
                    Constraint::Length(16),
                ],
            )
            .header(
                Row::new(vec!["", "Name", "IP", "Type", "Floor"]).style(theme::table_header()),
            );
            frame.render_widget(table, table_area);
        }

        let hints = Line::from(vec![
            Span::styled(" ↑↓ ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("locate  ", theme::key_hint()),
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("type  ", theme::key_hint()),
            Span::styled("a/o/x ", theme::key_hint_key()),
            Span::styled("list  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("close", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hint_area);
    }
}

/// `None` → first type → … → last type → `None`.
pub(crate) fn next_type_filter(types: &[String], current: Option<&str>) -> Option<String> {
    match current {
        None => types.first().cloned(),
        Some(t) => {
            let idx = types.iter().position(|x| x == t)?;
            types.get(idx + 1).cloned()
        }
    }
}

fn sidebar_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default())
}

impl Component for MapScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.overlay != Overlay::None {
            return Ok(self.handle_overlay_key(key));
        }

        match key.code {
            KeyCode::Char('[') => {
                self.state.step_floor(-1);
            }
            KeyCode::Char(']') => {
                self.state.step_floor(1);
            }
            KeyCode::Char('f') => {
                let count = self.type_ids().len();
                if count > 0 {
                    self.filter_cursor = (self.filter_cursor + 1) % count;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(type_id) = self.type_ids().get(self.filter_cursor) {
                    self.state.toggle_filter(type_id);
                }
            }
            KeyCode::Char('+' | '=') => self.zoom_at_centre(ZoomDirection::In),
            KeyCode::Char('-') => self.zoom_at_centre(ZoomDirection::Out),
            KeyCode::Left => self.pan(PAN_STEP_X, 0.0),
            KeyCode::Right => self.pan(-PAN_STEP_X, 0.0),
            KeyCode::Up => self.pan(0.0, PAN_STEP_Y),
            KeyCode::Down => self.pan(0.0, -PAN_STEP_Y),
            KeyCode::Char('0') => {
                self.state.reset_viewport();
            }
            KeyCode::Char('a') => self.open_list(StatusBucket::Total),
            KeyCode::Char('o') => self.open_list(StatusBucket::Online),
            KeyCode::Char('x') => self.open_list(StatusBucket::Offline),
            KeyCode::Char('t') => return Ok(Some(Action::EnterTvMode)),
            _ => {}
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                if let Some(pointer) = self.pointer(&mouse) {
                    let direction = if mouse.kind == MouseEventKind::ScrollUp {
                        ZoomDirection::In
                    } else {
                        ZoomDirection::Out
                    };
                    self.state
                        .viewport_mut()
                        .zoom_at_screen(pointer, direction);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if matches!(self.overlay, Overlay::Detail(_)) {
                    self.overlay = Overlay::None;
                }
                if self.overlay == Overlay::None {
                    if let Some(pointer) = self.pointer(&mouse) {
                        self.drag = Some(Drag {
                            gesture: self.state.viewport().begin_pan(pointer),
                            start: pointer,
                            moved: false,
                        });
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let pointer = self.raw_pointer(&mouse);
                if let Some(drag) = self.drag.as_mut() {
                    drag.gesture.update(self.state.viewport_mut(), pointer);
                    drag.moved |= pointer != drag.start;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(drag) = self.drag.take() {
                    if !drag.moved {
                        self.click(drag.start, Instant::now());
                    }
                }
            }
            MouseEventKind::Moved => {
                self.hovered = self.pointer(&mouse).and_then(|p| self.marker_at(p));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SiteConfigLoaded(config) => {
                self.state
                    .apply_config(config.clone(), self.preferred_floor.as_deref());
                let count = config.device_types.len();
                self.filter_cursor = self.filter_cursor.min(count.saturating_sub(1));
            }
            Action::SnapshotUpdated(snapshot) => {
                self.state.apply_snapshot(snapshot.clone());
                let len = match &self.overlay {
                    Overlay::List(view) => self.list_devices(view).len(),
                    _ => 0,
                };
                if let Overlay::List(view) = &mut self.overlay {
                    view.selected = view.selected.min(len.saturating_sub(1));
                }
            }
            Action::EnterTvMode => {
                self.state.enter_tv_mode();
            }
            Action::ExitTvMode => {
                self.state.exit_tv_mode();
            }
            Action::LocateDevice(id) => self.locate(id),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if area.width >= SIDEBAR_MIN_TOTAL {
            let [map_area, side_area] =
                Layout::horizontal([Constraint::Min(30), Constraint::Length(SIDEBAR_WIDTH)])
                    .areas(area);
            self.render_map(frame, map_area);
            self.render_sidebar(frame, side_area);
        } else {
            self.render_map(frame, area);
        }

        match &self.overlay {
            Overlay::None => {}
            Overlay::Detail(id) => self.render_detail(frame, area, id),
            Overlay::List(view) => self.render_list(frame, area, view),
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.overlay != Overlay::None
    }

    fn id(&self) -> &str {
        "Map"
    }
}

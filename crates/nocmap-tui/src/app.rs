//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nocmap_core::{Controller, ZoomLimits};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::overlay;

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Reconnecting(u32),
    Polling,
    Disconnected,
}

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Connection status indicator.
    connection_status: ConnectionStatus,
    /// Help overlay visibility.
    help_visible: bool,
    /// Action sender — components can dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Set after the first floor configuration; later ones are reloads.
    config_loaded: bool,
}

impl App {
    pub fn new(controller: Controller, limits: ZoomLimits, preferred_floor: Option<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(limits, preferred_floor).into_iter().collect();
        let active_screen = ScreenId::default();
        if let Some(screen) = screens.get_mut(&active_screen) {
            screen.set_focused(true);
        }

        Self {
            active_screen,
            previous_screen: None,
            screens,
            running: true,
            connection_status: ConnectionStatus::default(),
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            notification: None,
            config_loaded: false,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let bridge = tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // Open popups own every key
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                let screen = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                if let Some(screen) = screen {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => {
                return Ok(Some(if self.active_screen == ScreenId::Tv {
                    Action::ExitTvMode
                } else {
                    Action::GoBack
                }));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(None);
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    /// Move focus to `target`. Returns whether the active screen changed.
    fn switch_screen(&mut self, target: ScreenId) -> bool {
        if target == self.active_screen {
            return false;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        true
    }

    /// Deliver `action` to every screen, queueing their follow-ups.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn forward(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
            }

            Action::SwitchScreen(target) => {
                let from = self.active_screen;
                if self.switch_screen(*target) {
                    if *target == ScreenId::Tv {
                        self.action_tx.send(Action::EnterTvMode)?;
                    } else if from == ScreenId::Tv {
                        self.action_tx.send(Action::ExitTvMode)?;
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::EnterTvMode => {
                self.switch_screen(ScreenId::Tv);
                self.broadcast(action)?;
            }

            Action::ExitTvMode => {
                if self.active_screen == ScreenId::Tv {
                    let back = self
                        .previous_screen
                        .filter(|s| *s != ScreenId::Tv)
                        .unwrap_or(ScreenId::Map);
                    self.switch_screen(back);
                }
                self.broadcast(action)?;
            }

            Action::LocateDevice(_) => {
                self.switch_screen(ScreenId::Map);
                self.forward(ScreenId::Map, action)?;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Connected => {
                if matches!(
                    self.connection_status,
                    ConnectionStatus::Reconnecting(_) | ConnectionStatus::Polling
                ) {
                    self.action_tx
                        .send(Action::Notify(Notification::success("Live updates restored")))?;
                }
                self.connection_status = ConnectionStatus::Connected;
            }

            Action::Disconnected(reason) => {
                debug!(%reason, "connection lost");
                self.connection_status = ConnectionStatus::Disconnected;
            }

            Action::Reconnecting(attempt) => {
                self.connection_status = ConnectionStatus::Reconnecting(*attempt);
            }

            Action::Polling => {
                if self.connection_status != ConnectionStatus::Polling {
                    self.action_tx.send(Action::Notify(Notification::warning(
                        "Live updates unavailable, polling",
                    )))?;
                }
                self.connection_status = ConnectionStatus::Polling;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::Render => {}

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > TOAST_TTL {
                        self.notification = None;
                    }
                }
                self.forward(self.active_screen, action)?;
            }

            Action::SiteConfigLoaded(config) => {
                if self.config_loaded {
                    self.action_tx.send(Action::Notify(Notification::info(format!(
                        "Floor configuration reloaded ({} floors)",
                        config.floors.len()
                    ))))?;
                }
                self.config_loaded = true;
                self.broadcast(action)?;
            }

            // Data updates go to ALL screens so they stay in sync
            Action::SnapshotUpdated(_) => {
                self.broadcast(action)?;
            }
        }
        Ok(())
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }
        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection_indicator = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Polling => {
                Span::styled("● polling", Style::default().fg(theme::NEON_CYAN))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionStatus::Reconnecting(attempt) => Span::styled(
                format!("◐ reconnecting ({attempt})"),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
        };

        let server = Span::styled(
            format!(" {} ", self.controller.config().url),
            theme::key_hint(),
        );
        let hints = Span::styled("│ ? help  t tv  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), connection_indicator, server, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = overlay::centered_rect(area, 58, 24);
    let inner = overlay::render_frame(frame, popup, "Keyboard Shortcuts", theme::ELECTRIC_PURPLE);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        ))
    };
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let help_text = vec![
        section("Navigation"),
        entry("1-4 Tab", "Switch screen"),
        entry("Esc", "Back / close popup / leave TV mode"),
        entry("j/k ↑/↓", "Move selection"),
        Line::from(""),
        section("Map"),
        entry("[ ]", "Previous / next floor"),
        entry("+ - wheel", "Zoom"),
        entry("arrows drag", "Pan"),
        entry("0 dbl-click", "Reset view"),
        entry("f Space", "Pick / toggle type filter"),
        entry("a o x", "All / online / offline devices"),
        entry("click", "Device details"),
        entry("t", "TV mode"),
        Line::from(""),
        section("Global"),
        entry("?", "This help"),
        entry("q Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Notification toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len
        .saturating_add(6)
        .clamp(20, 60)
        .min(area.width.saturating_sub(2));
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

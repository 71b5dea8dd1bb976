use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use crossterm::event::{KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::io;

use crate::config::AppConfig;
use crate::prayer_times::alerts::StatusLines;
use crate::prayer_times::clock::Clock;
use crate::prayer_times::{
    default_engine, AlertTracker, LogNotifier, Notification, Notifier, ScheduleError,
    ScheduleState, ScheduleUpdate, ScheduleWorker, SystemClock,
};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, prayers, statusbar};

/// How long a notification stays on screen.
const BANNER_SECS: i64 = 30;
const MAX_NOTICE_MINUTES: u32 = 999;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Latitude,
    Longitude,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,

    // Latest schedule from the worker
    pub state: ScheduleState,
    pub selected: NaiveDate,
    pub tracker: AlertTracker,
    pub status: StatusLines,
    pub banner: Option<(Notification, DateTime<FixedOffset>)>,
    pub error: Option<String>,
    config_dirty: bool,
    pending_latitude: String,
}

impl App {
    pub fn new(config: AppConfig, today: NaiveDate) -> Self {
        let tracker = AlertTracker::new(config.notice_period);
        App {
            view: View::Dashboard,
            config,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            state: ScheduleState::default(),
            selected: today,
            tracker,
            status: StatusLines::default(),
            banner: None,
            error: None,
            config_dirty: false,
            pending_latitude: String::new(),
        }
    }

    /// Take a worker result. Stale states are dropped.
    pub fn apply(&mut self, update: ScheduleUpdate) {
        match update {
            ScheduleUpdate::State(state) => {
                if !state.is_newer_than(&self.state) {
                    return;
                }
                if let Some(date) = state.date {
                    if self.state.date != state.date {
                        self.selected = date;
                    }
                }
                if state.relative != self.config.relative {
                    self.config.relative = state.relative;
                    self.config_dirty = true;
                }
                self.state = *state;
                self.error = None;
            }
            ScheduleUpdate::Failed(ScheduleError::ConfigMissing) => {
                if self.input_mode == InputMode::Normal {
                    self.start_location_input();
                }
            }
            ScheduleUpdate::Failed(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn tick(&mut self, now: DateTime<FixedOffset>, worker: &ScheduleWorker) {
        let outcome = self.tracker.tick(&self.state, now);
        for notification in outcome.notifications {
            LogNotifier.notify(&notification);
            self.banner = Some((notification, now));
        }
        if outcome.refresh_today {
            worker.refresh_today();
        }
        self.status = outcome.status;

        if let Some((_, shown_at)) = &self.banner {
            if now - *shown_at >= Duration::seconds(BANNER_SECS) {
                self.banner = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent, worker: &ScheduleWorker) {
        // Some terminals also report key release and repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key, worker),
            InputMode::Latitude | InputMode::Longitude => self.handle_location_input(key, worker),
        }
        self.persist();
    }

    fn handle_normal_key(&mut self, key: crossterm::event::KeyEvent, worker: &ScheduleWorker) {
        if self.view == View::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.view = View::Dashboard;
            }
            return;
        }

        // Any key dismisses the error notice.
        self.error = None;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Left => self.move_selection(-1),
            KeyCode::Right => self.move_selection(1),
            KeyCode::Up => self.move_selection(-7),
            KeyCode::Down => self.move_selection(7),
            KeyCode::Enter | KeyCode::Char('r') => {
                worker.select_date(self.selected);
            }
            KeyCode::Char('t') => {
                self.selected = SystemClock.now().date_naive();
                worker.select_date(self.selected);
            }
            KeyCode::Char('v') => {
                self.config.relative = !self.config.relative;
                self.config_dirty = true;
                worker.set_relative(self.config.relative);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.set_notice_period(self.config.notice_period.saturating_add(1));
            }
            KeyCode::Char('-') => {
                self.set_notice_period(self.config.notice_period.saturating_sub(1));
            }
            KeyCode::Char('s') => {
                self.config.status_icon = !self.config.status_icon;
                self.config_dirty = true;
            }
            KeyCode::Char('l') => self.start_location_input(),
            _ => {}
        }
    }

    fn move_selection(&mut self, days: i64) {
        if let Some(date) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = date;
        }
    }

    fn set_notice_period(&mut self, minutes: u32) {
        let minutes = minutes.min(MAX_NOTICE_MINUTES);
        if minutes == self.config.notice_period {
            return;
        }
        self.config.notice_period = minutes;
        self.config_dirty = true;
        self.tracker
            .set_notice_period(minutes, &self.state, SystemClock.now());
    }

    fn start_location_input(&mut self) {
        self.input_mode = InputMode::Latitude;
        self.input_buffer = self.config.latitude.clone();
        self.input_error = None;
    }

    fn handle_location_input(&mut self, key: crossterm::event::KeyEvent, worker: &ScheduleWorker) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let trimmed = self.input_buffer.trim().to_string();
                if trimmed.parse::<f64>().is_err() {
                    self.input_error = Some(format!("'{}' is not a valid number", trimmed));
                    return;
                }
                match self.input_mode {
                    InputMode::Latitude => {
                        self.pending_latitude = trimmed;
                        self.input_mode = InputMode::Longitude;
                        self.input_buffer = self.config.longitude.clone();
                        self.input_error = None;
                    }
                    _ => {
                        self.config.latitude = std::mem::take(&mut self.pending_latitude);
                        self.config.longitude = trimmed;
                        self.config_dirty = true;
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        worker.set_coordinates(self.config.coordinates());
                        worker.select_date(self.selected);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    /// Write the config if anything changed since the last write.
    pub fn persist(&mut self) {
        if !self.config_dirty {
            return;
        }
        match self.config.save() {
            Ok(()) => self.config_dirty = false,
            Err(e) => warn!("Could not save settings: {:#}", e),
        }
    }

    pub fn draw(&self, frame: &mut Frame, now: DateTime<FixedOffset>) {
        self.draw_dashboard(frame, now);

        if self.view == View::Help {
            self.draw_help_overlay(frame);
        }
        if self.input_mode != InputMode::Normal {
            self.draw_location_input(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, now: DateTime<FixedOffset>) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let footer = if self.config.status_icon { 2 } else { 1 };
        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),      // header
                Constraint::Min(0),         // body
                Constraint::Length(1),      // error line
                Constraint::Length(footer), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], &self.state, self.selected, now);

        let status = self.config.status_icon.then_some(&self.status);
        statusbar::render(frame, outer_chunks[3], status);

        if let Some(error) = &self.error {
            let line = Paragraph::new(Line::from(vec![
                Span::styled("  ✗ ", theme::red()),
                Span::styled(error.as_str(), theme::red()),
            ]));
            frame.render_widget(line, outer_chunks[2]);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[0]);
        prayers::render(frame, left[0], &self.state, now);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[1]);
        let next = self
            .state
            .remaining(now)
            .map(|(name, remaining)| {
                let at = self.state.prayer(name).today_value.as_str();
                (name, at, remaining)
            });
        next_prayer::render(
            frame,
            right[0],
            next,
            self.banner.as_ref().map(|(notification, _)| notification),
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(14).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let notice = format_notice(self.tracker.notice_minutes());
        let bindings = [
            ("  [← →]        ", "Previous / next day"),
            ("  [↑ ↓]        ", "Previous / next week"),
            ("  [Enter] [r]  ", "Show the selected day"),
            ("  [t]          ", "Back to today"),
            ("  [v]          ", "Toggle relative times"),
            ("  [+] [-]      ", notice.as_str()),
            ("  [l]          ", "Set latitude / longitude"),
            ("  [s]          ", "Toggle status lines"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc]        ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_location_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let label = match self.input_mode {
            InputMode::Latitude => "  Latitude:  ",
            _ => "  Longitude: ",
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(label, theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()), // block cursor
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Decimal degrees, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(" Location ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        let paragraph = Paragraph::new(text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

fn format_notice(minutes: i64) -> String {
    if minutes == 0 {
        "Notice period (early alerts off)".to_string()
    } else {
        format!("Notice period ±1 ({} min)", minutes)
    }
}

/// Run the TUI event loop.
pub fn run(config: AppConfig) -> Result<()> {
    let clock = SystemClock;
    let mut app = App::new(config, clock.now().date_naive());

    let events = EventHandler::new(500);
    let tx = events.sender();
    let engine = default_engine(
        AppConfig::cache_dir(),
        app.config.coordinates(),
        app.config.relative,
    );
    let worker = ScheduleWorker::spawn(engine, move |update| {
        let _ = tx.send(Event::Schedule(update));
    });

    if app.config.coordinates().is_set() {
        worker.refresh_today();
    } else {
        app.apply(ScheduleUpdate::Failed(ScheduleError::ConfigMissing));
    }

    let mut terminal = ratatui::init();
    let mut last_title = String::new();

    loop {
        let now = clock.now();
        terminal.draw(|frame| app.draw(frame, now))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, &worker);
                if app.should_quit {
                    break;
                }
            }
            Event::Tick => {
                app.tick(clock.now(), &worker);
                // The terminal title stands in for a tray tooltip.
                if app.config.status_icon {
                    let title = app.status.tooltip().replace('\n', "  ·  ");
                    if title != last_title {
                        execute!(io::stdout(), SetTitle(&title))?;
                        last_title = title;
                    }
                }
            }
            Event::Schedule(update) => {
                app.apply(update);
            }
        }
    }

    ratatui::restore();
    app.persist();
    Ok(())
}

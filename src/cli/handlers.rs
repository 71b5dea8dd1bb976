use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::cli::args::CacheCommands;
use crate::config::AppConfig;
use crate::models::PrayerName;
use crate::prayer_times::alerts::StatusLines;
use crate::prayer_times::clock::Clock;
use crate::prayer_times::{
    default_engine, AlertTracker, LogNotifier, Notification, Notifier, ScheduleError,
    ScheduleState, ScheduleUpdate, ScheduleWorker, SystemClock,
};
use crate::utils::format::format_countdown;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn print_missing_coordinates() {
    println_colored!(
        AMBER,
        "  No location set. Run `salawaat config --latitude <LAT> --longitude <LON>` first."
    );
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(config: &AppConfig, date: Option<NaiveDate>, absolute: bool) -> Result<()> {
    let relative = config.relative && !absolute;
    let mut engine = default_engine(AppConfig::cache_dir(), config.coordinates(), relative);
    let today = Local::now().date_naive();

    let result = match date {
        Some(date) => engine.select_date(date).cloned(),
        None => engine.refresh(today, true, true).cloned(),
    };
    let state = match result {
        Ok(state) => state,
        Err(ScheduleError::ConfigMissing) => {
            print_missing_coordinates();
            return Ok(());
        }
        Err(e) => return Err(e).context("Loading prayer times"),
    };

    print_schedule(&state, relative);
    Ok(())
}

fn print_schedule(state: &ScheduleState, relative: bool) {
    let now = SystemClock.now();
    let shown = state.date.unwrap_or_else(|| now.date_naive());
    let current = state.current_at(now).map(|p| p.name);

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times · {} ({})",
        state.coordinates,
        shown.format("%A %Y-%m-%d")
    );
    println!();

    for prayer in state.ordered() {
        let line = format!("  {:<10}  {}", prayer.name.display_name(), prayer.display_value);
        let is_past = state.show_today && prayer.display.is_some_and(|t| t <= now);
        if Some(prayer.name) == current {
            println_colored!(GOLD, "{}{}", BOLD, line);
        } else if is_past {
            println_colored!(DIM, "{}", line);
        } else {
            println!("{}", line);
        }
    }

    if relative && state.show_today && !state.rotated {
        println!();
        println_colored!(DIM, "  Relative times unavailable, showing today's times");
    }

    if let Some((name, remaining)) = state.remaining(now) {
        let at = &state.prayer(name).today_value;
        println!();
        println_colored!(
            AMBER,
            "  Next: {} at {} in {}",
            name.display_name(),
            at,
            format_countdown(remaining)
        );
    }
    println!();
}

// ─── Watch ───────────────────────────────────────────────────────────────────

/// Prints alerts to the terminal and logs them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        LogNotifier.notify(notification);
        let color = match notification {
            Notification::Upcoming { .. } => AMBER,
            Notification::Arrived { .. } => GOLD,
        };
        println_colored!(
            color,
            "  [{}] {}: {}",
            Local::now().format("%H:%M:%S"),
            notification.title(),
            notification.body()
        );
    }
}

/// Picks the status lines worth printing: the current line whenever it changes,
/// the next line whenever the next prayer changes.
#[derive(Default)]
struct StatusPrinter {
    current: Option<String>,
    next: Option<PrayerName>,
}

impl StatusPrinter {
    fn changed_lines(&mut self, status: &StatusLines, next: Option<PrayerName>) -> Vec<String> {
        let mut lines = Vec::new();
        if status.current != self.current {
            lines.extend(status.current.clone());
            self.current = status.current.clone();
        }
        if next != self.next {
            lines.extend(status.next.clone());
            self.next = next;
        }
        lines
    }
}

pub fn handle_watch(config: &AppConfig) -> Result<()> {
    if !config.coordinates().is_set() {
        print_missing_coordinates();
        return Ok(());
    }

    let engine = default_engine(AppConfig::cache_dir(), config.coordinates(), config.relative);
    let (tx, rx) = mpsc::channel();
    let worker = ScheduleWorker::spawn(engine, move |update| {
        let _ = tx.send(update);
    });
    worker.refresh_today();

    let clock = SystemClock;
    let notifier = ConsoleNotifier;
    let mut tracker = AlertTracker::new(config.notice_period);
    let mut state = ScheduleState::default();
    let mut status_printer = StatusPrinter::default();
    let mut last_tick = Instant::now();

    println_colored!(GOLD, "  Watching prayer times for {}", config.coordinates());

    loop {
        let timeout = Duration::from_secs(1)
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        match rx.recv_timeout(timeout) {
            Ok(ScheduleUpdate::State(next)) => {
                if next.is_newer_than(&state) {
                    state = *next;
                }
            }
            Ok(ScheduleUpdate::Failed(e)) => {
                println_colored!(RED, "  ✗ {}", e);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_tick.elapsed() < Duration::from_secs(1) {
            continue;
        }
        last_tick = Instant::now();

        let now = clock.now();
        let outcome = tracker.tick(&state, now);
        for notification in &outcome.notifications {
            notifier.notify(notification);
        }
        if outcome.refresh_today {
            worker.refresh_today();
        }

        if config.status_icon {
            let next = state.next_after(now).map(|p| p.name);
            for line in status_printer.changed_lines(&outcome.status, next) {
                println_colored!(DIM, "  {}", line);
            }
        }
    }

    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(
    config: &mut AppConfig,
    latitude: Option<String>,
    longitude: Option<String>,
    notice: Option<u32>,
    relative: Option<bool>,
    status_icon: Option<bool>,
) -> Result<()> {
    let changed = latitude.is_some()
        || longitude.is_some()
        || notice.is_some()
        || relative.is_some()
        || status_icon.is_some();

    if let Some(latitude) = latitude {
        config.latitude = latitude.trim().to_string();
    }
    if let Some(longitude) = longitude {
        config.longitude = longitude.trim().to_string();
    }
    if let Some(notice) = notice {
        config.notice_period = notice;
    }
    if let Some(relative) = relative {
        config.relative = relative;
    }
    if let Some(status_icon) = status_icon {
        config.status_icon = status_icon;
    }
    if changed {
        config.save()?;
    }

    println!();
    println_colored!(GOLD, "  Settings ({})", AppConfig::config_path()?.display());
    println!();
    println!("  {:<18}  {}", "latitude", config.latitude);
    println!("  {:<18}  {}", "longitude", config.longitude);
    println!("  {:<18}  {} min", "notice period", config.notice_period);
    println!("  {:<18}  {}", "relative times", config.relative);
    println!("  {:<18}  {}", "status lines", config.status_icon);
    println!();
    Ok(())
}

// ─── Cache ───────────────────────────────────────────────────────────────────

pub fn handle_cache(action: &CacheCommands) -> Result<()> {
    let dir = AppConfig::cache_dir();
    match action {
        CacheCommands::Path => println!("{}", dir.display()),
        CacheCommands::Clear => {
            if !dir.exists() {
                println_colored!(DIM, "  Cache is already empty");
                return Ok(());
            }
            let mut removed = 0;
            for entry in std::fs::read_dir(&dir).with_context(|| format!("Reading {:?}", dir))? {
                let path = entry?.path();
                if path.is_file() {
                    std::fs::remove_file(&path)
                        .with_context(|| format!("Removing {:?}", path))?;
                    removed += 1;
                }
            }
            println_colored!(GOLD, "  Removed {} cached year table(s)", removed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(current: &str, next: &str) -> StatusLines {
        StatusLines {
            current: Some(current.to_string()),
            next: Some(next.to_string()),
        }
    }

    #[test]
    fn test_watch_prints_both_status_lines_on_change() {
        let mut printer = StatusPrinter::default();

        let first = printer.changed_lines(
            &status("Dhuhr since 12:01", "'Asr will be at 14:50 in 2:20:00"),
            Some(PrayerName::Asr),
        );
        assert_eq!(
            first,
            vec!["Dhuhr since 12:01", "'Asr will be at 14:50 in 2:20:00"]
        );

        // Countdown ticking alone prints nothing.
        let ticking = printer.changed_lines(
            &status("Dhuhr since 12:01", "'Asr will be at 14:50 in 2:19:59"),
            Some(PrayerName::Asr),
        );
        assert!(ticking.is_empty());

        let arrived = printer.changed_lines(
            &status("'Asr since 14:50", "Maghrib will be at 17:10 in 2:20:00"),
            Some(PrayerName::Maghrib),
        );
        assert_eq!(
            arrived,
            vec!["'Asr since 14:50", "Maghrib will be at 17:10 in 2:20:00"]
        );
    }
}

use chrono::{DateTime, Duration, FixedOffset};
use log::{debug, info};

use crate::models::PrayerName;
use crate::prayer_times::schedule::ScheduleState;
use crate::utils::format::{format_clock, format_countdown};

/// How often a day change is polled for once it has been noticed.
pub const DAY_POLL_INTERVAL_SECS: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Upcoming {
        prayer: PrayerName,
        at: String,
        remaining: Duration,
    },
    Arrived {
        prayer: PrayerName,
        at: String,
    },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Notification::Upcoming { .. } => "prayer alert",
            Notification::Arrived { .. } => "prayer time",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::Upcoming {
                prayer,
                at,
                remaining,
            } => format!("{} will be at {} in {}", prayer, at, format_countdown(*remaining)),
            Notification::Arrived { prayer, at } => format!("{}: {}", prayer, at),
        }
    }
}

/// Where notifications go. Desktop delivery lives outside this crate.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!("{}: {}", notification.title(), notification.body());
    }
}

/// The two tray lines: what is current and what comes next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLines {
    pub current: Option<String>,
    pub next: Option<String>,
}

impl StatusLines {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.current.iter().chain(self.next.iter()).map(String::as_str)
    }

    pub fn tooltip(&self) -> String {
        let lines: Vec<&str> = self.lines().collect();
        if lines.is_empty() {
            "salawaat".to_string()
        } else {
            lines.join("\n")
        }
    }
}

#[derive(Debug, Default)]
pub struct TickOutcome {
    pub notifications: Vec<Notification>,
    /// The schedule should be reloaded for the real today.
    pub refresh_today: bool,
    pub status: StatusLines,
}

/// Per-second bookkeeping on top of a [`ScheduleState`]: one "upcoming" alert
/// per prayer inside the notice period, one "arrived" alert when it passes, and
/// a throttled reload once the calendar day changes.
pub struct AlertTracker {
    notice: Duration,
    alert_sent: bool,
    next: Option<(PrayerName, DateTime<FixedOffset>)>,
    day_poll: Option<DateTime<FixedOffset>>,
}

impl AlertTracker {
    pub fn new(notice_minutes: u32) -> Self {
        Self {
            notice: Duration::minutes(notice_minutes as i64),
            alert_sent: false,
            next: None,
            day_poll: None,
        }
    }

    pub fn notice_minutes(&self) -> i64 {
        self.notice.num_minutes()
    }

    /// A sent alert stays sent only while still inside the new window;
    /// otherwise it fires again when the new window is entered.
    pub fn set_notice_period(
        &mut self,
        minutes: u32,
        state: &ScheduleState,
        now: DateTime<FixedOffset>,
    ) {
        let notice = Duration::minutes(minutes as i64);
        if notice == self.notice {
            return;
        }
        self.notice = notice;
        let inside = state
            .next_after(now)
            .and_then(|p| p.today)
            .is_some_and(|t| now >= t - notice);
        self.alert_sent &= inside;
    }

    pub fn tick(&mut self, state: &ScheduleState, now: DateTime<FixedOffset>) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        // Also polls while nothing has loaded yet, so a failed first load retries.
        if state.today == Some(now.date_naive()) {
            self.day_poll = None;
        } else {
            let noticed = *self.day_poll.get_or_insert(now);
            if now - noticed >= Duration::seconds(DAY_POLL_INTERVAL_SECS) {
                debug!("Today not loaded, reloading");
                self.day_poll = Some(now);
                outcome.refresh_today = true;
            }
        }

        let next = state
            .next_after(now)
            .and_then(|p| p.today.map(|t| (p, t)));
        let next_key = next.map(|(p, t)| (p.name, t));

        if next_key.map(|(name, _)| name) != self.next.map(|(name, _)| name) {
            if let Some((previous, at)) = self.next {
                if at <= now {
                    outcome.notifications.push(Notification::Arrived {
                        prayer: previous,
                        at: format_clock(at),
                    });
                    outcome.refresh_today = true;
                }
            }
            self.alert_sent = false;
        }
        self.next = next_key;

        if let Some((prayer, at)) = next {
            let remaining = at - now;
            outcome.status.next = Some(format!(
                "{} will be at {} in {}",
                prayer.name,
                prayer.today_value,
                format_countdown(remaining)
            ));

            if !self.alert_sent && now >= at - self.notice {
                outcome.notifications.push(Notification::Upcoming {
                    prayer: prayer.name,
                    at: prayer.today_value.clone(),
                    remaining,
                });
                self.alert_sent = true;
            }
        }

        if let Some(current) = state.current_at(now) {
            outcome.status.current =
                Some(format!("{} since {}", current.name, current.display_value));
        }

        outcome
    }
}

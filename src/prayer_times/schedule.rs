use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};
use log::{debug, warn};
use std::sync::Arc;

use crate::models::{Coordinates, DailyTimes, Prayer, PrayerName, YearTable};
use crate::prayer_times::clock::{Clock, SystemClock};
use crate::prayer_times::error::{FetchError, ScheduleError};
use crate::prayer_times::source::YearSource;
use crate::utils::format::format_clock;

/// Everything a view needs to draw the schedule. Published whole after every
/// successful refresh; never partially updated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState {
    /// Increases with every published state. Consumers drop older ones.
    pub generation: u64,
    pub prayers: [Prayer; PrayerName::COUNT],
    /// Visual order. Canonical unless relative mode rotated it.
    pub order: [PrayerName; PrayerName::COUNT],
    /// Day the display values belong to.
    pub date: Option<NaiveDate>,
    /// Day the `today` values were last loaded for.
    pub today: Option<NaiveDate>,
    pub today_coordinates: Option<Coordinates>,
    pub show_today: bool,
    /// The relative-mode setting.
    pub relative: bool,
    /// Whether the display actually wraps around now in this state.
    pub rotated: bool,
    pub coordinates: Coordinates,
    pub current: Option<PrayerName>,
    pub next: Option<PrayerName>,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            generation: 0,
            prayers: PrayerName::ALL.map(Prayer::new),
            order: PrayerName::ALL,
            date: None,
            today: None,
            today_coordinates: None,
            show_today: true,
            relative: false,
            rotated: false,
            coordinates: Coordinates::default(),
            current: None,
            next: None,
        }
    }
}

impl ScheduleState {
    pub fn prayer(&self, name: PrayerName) -> &Prayer {
        &self.prayers[name.index()]
    }

    pub fn ordered(&self) -> impl Iterator<Item = &Prayer> {
        self.order.iter().map(|name| self.prayer(*name))
    }

    pub fn is_newer_than(&self, other: &ScheduleState) -> bool {
        self.generation > other.generation
    }

    /// Last prayer, in canonical order, displayed at or before `now`.
    pub fn current_at(&self, now: DateTime<FixedOffset>) -> Option<&Prayer> {
        if !self.show_today {
            return None;
        }
        self.prayers
            .iter()
            .rev()
            .find(|p| p.display.is_some_and(|t| t <= now))
    }

    /// Soonest prayer whose `today` instant is still ahead of `now`.
    pub fn next_after(&self, now: DateTime<FixedOffset>) -> Option<&Prayer> {
        self.prayers
            .iter()
            .filter(|p| p.today.is_some_and(|t| t > now))
            .min_by_key(|p| p.today)
    }

    pub fn remaining(&self, now: DateTime<FixedOffset>) -> Option<(PrayerName, Duration)> {
        self.next_after(now)
            .and_then(|p| p.today.map(|t| (p.name, t - now)))
    }
}

struct LoadedYear {
    year: i32,
    coordinates: Coordinates,
    table: Arc<YearTable>,
}

/// Turns year tables into the displayed schedule for a day, including the
/// relative-mode wrap around now.
pub struct ScheduleEngine<S, C = SystemClock> {
    source: S,
    clock: C,
    coordinates: Coordinates,
    relative: bool,
    selected: NaiveDate,
    loaded: Option<LoadedYear>,
    state: ScheduleState,
}

impl<S: YearSource, C: Clock> ScheduleEngine<S, C> {
    pub fn new(source: S, clock: C, coordinates: Coordinates, relative: bool) -> Self {
        let selected = clock.now().date_naive();
        Self {
            source,
            clock,
            coordinates,
            relative,
            selected,
            loaded: None,
            state: ScheduleState {
                relative,
                ..ScheduleState::default()
            },
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn relative(&self) -> bool {
        self.relative
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        if coordinates != self.coordinates {
            debug!("Coordinates changed to {}", coordinates);
            self.coordinates = coordinates;
            self.loaded = None;
        }
    }

    /// Load the schedule for `selected` (or the real today when `set_today`).
    /// `update_today` also rewrites the alerting instants. On error the
    /// previous state is kept.
    pub fn refresh(
        &mut self,
        selected: NaiveDate,
        update_today: bool,
        set_today: bool,
    ) -> Result<&ScheduleState, ScheduleError> {
        let requested = if set_today {
            self.clock.now().date_naive()
        } else {
            selected
        };
        let show_today = self.state.show_today || set_today;
        self.load(requested, update_today, show_today)?;
        Ok(&self.state)
    }

    /// Show a specific calendar day. Any day other than today turns relative
    /// mode off, and today's alert instants are reloaded when the location
    /// changed since they were last loaded. On error nothing changes,
    /// including the relative setting.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<&ScheduleState, ScheduleError> {
        let today = self.clock.now().date_naive();
        let show_today = date == today;
        let stale_today = self.state.today_coordinates.as_ref() != Some(&self.coordinates);

        let previous = (self.relative, self.selected, self.state.clone());
        if !show_today {
            self.relative = false;
        }
        let mut result = self.load(date, show_today, show_today);
        if result.is_ok() && !show_today && stale_today {
            result = self.load(today, true, false);
        }
        if let Err(e) = result {
            (self.relative, self.selected, self.state) = previous;
            return Err(e);
        }
        Ok(&self.state)
    }

    pub fn set_relative(&mut self, relative: bool) -> Result<&ScheduleState, ScheduleError> {
        self.relative = relative;
        self.refresh(self.selected, true, relative)
    }

    fn load(
        &mut self,
        requested: NaiveDate,
        update_today: bool,
        show_today: bool,
    ) -> Result<(), ScheduleError> {
        if !self.coordinates.is_set() {
            return Err(ScheduleError::ConfigMissing);
        }
        debug!(
            "Refreshing {} (update_today={}, show_today={})",
            requested, update_today, show_today
        );

        let now = self.clock.now();
        let table = self.year_table(requested.year())?;
        let day = table
            .day(requested.ordinal())
            .ok_or(ScheduleError::MissingDay { date: requested })?;

        let mut next = self.state.clone();
        next.show_today = show_today;
        next.relative = self.relative;
        let writes_display = !update_today || show_today;

        let mut base = [None; PrayerName::COUNT];
        for name in PrayerName::ALL {
            let instant = self.instant(requested, day, name)?;
            base[name.index()] = Some(instant);
            set_day(&mut next, name, instant, update_today, writes_display);
        }

        next.order = PrayerName::ALL;
        next.rotated = false;
        if update_today && show_today {
            let offset = PrayerName::ALL
                .iter()
                .rposition(|name| base[name.index()].is_some_and(|t| now >= t))
                .unwrap_or(0);

            match self.wrap(&mut next, requested, &table, offset, now) {
                Ok(offset) => {
                    if self.relative {
                        next.order = rotated(offset);
                        next.rotated = true;
                    }
                }
                Err(e) => {
                    warn!("Relative times disabled for this refresh: {}", e);
                    for name in PrayerName::ALL {
                        if let Some(instant) = base[name.index()] {
                            set_day(&mut next, name, instant, true, true);
                        }
                    }
                }
            }
        }

        if writes_display {
            next.date = Some(requested);
            self.selected = requested;
        }
        if update_today {
            next.today = Some(requested);
            next.today_coordinates = Some(self.coordinates.clone());
        }
        next.coordinates = self.coordinates.clone();
        next.current = next.current_at(now).map(|p| p.name);
        next.next = next.next_after(now).map(|p| p.name);
        next.generation = self.state.generation + 1;
        self.state = next;
        Ok(())
    }

    /// Borrow neighbouring days so the six prayers surround now: every prayer
    /// before `offset` comes from the following day, and before fajr isha comes
    /// from the previous day. Returns the index the visual order starts at.
    fn wrap(
        &self,
        state: &mut ScheduleState,
        requested: NaiveDate,
        table: &Arc<YearTable>,
        offset: usize,
        now: DateTime<FixedOffset>,
    ) -> Result<usize, ScheduleError> {
        let mut offset = offset;
        if self.relative {
            for name in &PrayerName::ALL[..offset] {
                self.wrap_one(state, requested, table, 1, *name)?;
            }
        }

        let before_fajr = state
            .prayer(PrayerName::Fajr)
            .today
            .is_some_and(|fajr| now < fajr);
        if offset == 0 && before_fajr {
            offset = PrayerName::Isha.index();
            self.wrap_one(state, requested, table, -1, PrayerName::Isha)?;
        }
        Ok(offset)
    }

    fn wrap_one(
        &self,
        state: &mut ScheduleState,
        requested: NaiveDate,
        table: &Arc<YearTable>,
        direction: i64,
        name: PrayerName,
    ) -> Result<(), ScheduleError> {
        let date = requested + Duration::days(direction);
        let table = if date.year() == requested.year() {
            Arc::clone(table)
        } else {
            Arc::new(self.source.fetch_year(date.year(), &self.coordinates)?)
        };
        let day = table
            .day(date.ordinal())
            .ok_or(ScheduleError::MissingDay { date })?;
        let instant = self.instant(date, day, name)?;
        set_day(state, name, instant, true, self.relative);
        Ok(())
    }

    fn year_table(&mut self, year: i32) -> Result<Arc<YearTable>, FetchError> {
        if let Some(loaded) = &self.loaded {
            if loaded.year == year && loaded.coordinates == self.coordinates {
                return Ok(Arc::clone(&loaded.table));
            }
        }

        let table = Arc::new(self.source.fetch_year(year, &self.coordinates)?);
        self.loaded = Some(LoadedYear {
            year,
            coordinates: self.coordinates.clone(),
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// The table's clock times are UTC; place them on `date` in the local zone.
    fn instant(
        &self,
        date: NaiveDate,
        day: &DailyTimes,
        name: PrayerName,
    ) -> Result<DateTime<FixedOffset>, ScheduleError> {
        let time = parse_clock(day.get(name))?;
        let offset = self.clock.offset_on(date);
        Ok(DateTime::from_naive_utc_and_offset(date.and_time(time), offset))
    }
}

fn set_day(
    state: &mut ScheduleState,
    name: PrayerName,
    instant: DateTime<FixedOffset>,
    update_today: bool,
    update_display: bool,
) {
    let value = format_clock(instant);
    let prayer = &mut state.prayers[name.index()];
    if update_today {
        prayer.today = Some(instant);
        prayer.today_value = value.clone();
    }
    if update_display {
        prayer.display = Some(instant);
        prayer.display_value = value;
    }
}

fn rotated(offset: usize) -> [PrayerName; PrayerName::COUNT] {
    let mut order = PrayerName::ALL;
    order.rotate_left(offset % PrayerName::COUNT);
    order
}

/// Parse "H:MM" or "HH:MM".
pub fn parse_clock(value: &str) -> Result<NaiveTime, ScheduleError> {
    let bad = || ScheduleError::BadTime {
        value: value.to_string(),
    };
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(bad)?;
    let hours: u32 = hours.parse().map_err(|_| bad())?;
    let minutes: u32 = minutes.parse().map_err(|_| bad())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(bad)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::prayer_times::clock::tests::ManualClock;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Year tables held in memory. Each day's fajr minute encodes its
    /// day-of-year so borrowed days are recognisable.
    #[derive(Clone, Default)]
    pub struct MemorySource {
        years: HashMap<i32, Result<YearTable, FetchError>>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MemorySource {
        pub fn with_year(mut self, year: i32) -> Self {
            let days = if NaiveDate::from_ymd_opt(year, 12, 31).unwrap().ordinal() == 366 {
                366
            } else {
                365
            };
            let table = (1..=days)
                .map(|ordinal| DailyTimes {
                    fajr: "5:12".to_string(),
                    sunrise: "6:45".to_string(),
                    dhuhr: "12:01".to_string(),
                    asr: "14:50".to_string(),
                    maghrib: "17:10".to_string(),
                    isha: format!("18:{:02}", 35 + ordinal % 20),
                })
                .collect();
            self.years.insert(year, Ok(YearTable::new(table)));
            self
        }

        pub fn failing_year(mut self, year: i32, error: FetchError) -> Self {
            self.years.insert(year, Err(error));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl YearSource for MemorySource {
        fn fetch_year(
            &self,
            year: i32,
            _coordinates: &Coordinates,
        ) -> Result<YearTable, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.years.get(&year).cloned().unwrap_or_else(|| {
                Err(FetchError::Unreachable {
                    url: format!("memory://{}", year),
                    reason: "no table".to_string(),
                })
            })
        }
    }

    pub fn amman() -> Coordinates {
        Coordinates::new("31.95", "35.91")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine(
        source: MemorySource,
        clock: &ManualClock,
        relative: bool,
    ) -> ScheduleEngine<MemorySource, ManualClock> {
        ScheduleEngine::new(source, clock.clone(), amman(), relative)
    }

    fn all_years() -> MemorySource {
        MemorySource::default()
            .with_year(2023)
            .with_year(2024)
            .with_year(2025)
    }

    fn display_values(state: &ScheduleState) -> Vec<String> {
        state.ordered().map(|p| p.display_value.clone()).collect()
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("5:12").unwrap(), NaiveTime::from_hms_opt(5, 12, 0).unwrap());
        assert_eq!(parse_clock("18:35").unwrap(), NaiveTime::from_hms_opt(18, 35, 0).unwrap());
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("noon").is_err());
        assert!(parse_clock("5").is_err());
    }

    #[test]
    fn test_first_of_january_values() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, false);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        let values: Vec<&str> = state.prayers.iter().map(|p| p.today_value.as_str()).collect();
        assert_eq!(values, ["5:12", "6:45", "12:01", "14:50", "17:10", "18:36"]);
        assert_eq!(state.today, Some(date(2024, 1, 1)));
        assert_eq!(state.order, PrayerName::ALL);
    }

    #[test]
    fn test_current_and_next_at_half_past_noon() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, false);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        assert_eq!(state.current, Some(PrayerName::Dhuhr));
        assert_eq!(state.next, Some(PrayerName::Asr));
        let (name, remaining) = state.remaining(clock.now()).unwrap();
        assert_eq!(name, PrayerName::Asr);
        assert_eq!(remaining, Duration::hours(2) + Duration::minutes(20));
    }

    #[test]
    fn test_display_only_refresh_keeps_today_values() {
        let clock = ManualClock::at(2024, 3, 10, 9, 0);
        let mut engine = engine(all_years(), &clock, false);
        let before = engine.refresh(date(2024, 3, 10), true, true).unwrap().clone();
        let after = engine.refresh(date(2024, 3, 10), false, false).unwrap().clone();

        for (a, b) in before.prayers.iter().zip(after.prayers.iter()) {
            assert_eq!(a.today, b.today);
            assert_eq!(a.today_value, b.today_value);
        }
        assert!(after.is_newer_than(&before));
    }

    #[test]
    fn test_relative_wraps_passed_prayers_to_tomorrow() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, true);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        assert!(state.rotated);
        assert_eq!(state.order[0], PrayerName::Dhuhr);
        let fajr = state.prayer(PrayerName::Fajr).display.unwrap();
        assert_eq!(fajr.date_naive(), date(2024, 1, 2));
        assert_eq!(state.current, Some(PrayerName::Dhuhr));
        assert_eq!(state.next, Some(PrayerName::Asr));
        assert_eq!(
            display_values(state),
            ["12:01", "14:50", "17:10", "18:36", "5:12", "6:45"]
        );
    }

    #[test]
    fn test_relative_before_fajr_borrows_yesterdays_isha() {
        let clock = ManualClock::at(2024, 1, 1, 4, 0);
        let source = all_years();
        let mut engine = engine(source.clone(), &clock, true);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        assert!(state.rotated);
        assert_eq!(state.order[0], PrayerName::Isha);
        let isha = state.prayer(PrayerName::Isha);
        assert_eq!(isha.display.unwrap().date_naive(), date(2023, 12, 31));
        // Ordinal 365 of 2023.
        assert_eq!(isha.display_value, "18:40");
        assert_eq!(state.current, Some(PrayerName::Isha));
        assert_eq!(state.next, Some(PrayerName::Fajr));
        // 2024 for the day, 2023 for the borrowed isha.
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_relative_display_surrounds_now_all_day() {
        for (h, m) in [(0, 10), (5, 12), (6, 0), (12, 30), (14, 50), (17, 30), (23, 59)] {
            let clock = ManualClock::at(2024, 12, 31, h, m);
            let mut engine = engine(all_years(), &clock, true);
            let state = engine.refresh(date(2024, 12, 31), true, true).unwrap();
            let now = clock.now();

            let displayed: Vec<_> = state.ordered().map(|p| p.display.unwrap()).collect();
            let past = displayed.iter().filter(|t| **t <= now).count();
            assert_eq!(past, 1, "at {}:{}", h, m);
            assert!(displayed[0] <= now, "at {}:{}", h, m);
            assert!(
                displayed.windows(2).all(|w| w[0] < w[1]),
                "not a contiguous cycle at {}:{}: {:?}",
                h,
                m,
                displayed
            );
            assert!(displayed[5] - displayed[0] < Duration::days(1));
        }
    }

    #[test]
    fn test_absolute_mode_keeps_canonical_order() {
        let clock = ManualClock::at(2024, 1, 1, 4, 0);
        let mut engine = engine(all_years(), &clock, false);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        assert!(!state.rotated);
        assert_eq!(state.order, PrayerName::ALL);
        assert_eq!(state.current, None);
        for p in &state.prayers {
            assert_eq!(p.display.unwrap().date_naive(), date(2024, 1, 1));
        }
    }

    #[test]
    fn test_wrap_failure_falls_back_to_canonical_order() {
        let clock = ManualClock::at(2024, 1, 1, 4, 0);
        let source = MemorySource::default().with_year(2024).failing_year(
            2023,
            FetchError::ServerError {
                status: 503,
                url: "memory://2023".to_string(),
            },
        );
        let mut engine = engine(source, &clock, true);
        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();

        assert!(!state.rotated);
        assert_eq!(state.order, PrayerName::ALL);
        let isha = state.prayer(PrayerName::Isha);
        assert_eq!(isha.display.unwrap().date_naive(), date(2024, 1, 1));
        assert_eq!(isha.today.unwrap().date_naive(), date(2024, 1, 1));
        // Setting survives; only this refresh fell back.
        assert!(state.relative);
        assert!(engine.relative());
    }

    #[test]
    fn test_new_years_eve_wraps_into_next_year() {
        let clock = ManualClock::at(2024, 12, 31, 20, 0);
        let mut engine = engine(all_years(), &clock, true);
        let state = engine.refresh(date(2024, 12, 31), true, true).unwrap();

        assert!(state.rotated);
        assert_eq!(state.order[0], PrayerName::Isha);
        let fajr = state.prayer(PrayerName::Fajr);
        assert_eq!(fajr.display.unwrap().date_naive(), date(2025, 1, 1));
        // Alerts follow the borrowed day too.
        assert_eq!(state.next, Some(PrayerName::Fajr));
    }

    #[test]
    fn test_server_error_keeps_previous_schedule() {
        let clock = ManualClock::at(2024, 6, 1, 12, 0);
        let source = MemorySource::default().with_year(2024).failing_year(
            2025,
            FetchError::ServerError {
                status: 500,
                url: "memory://2025".to_string(),
            },
        );
        let mut engine = engine(source, &clock, false);
        let before = engine.refresh(date(2024, 6, 1), true, true).unwrap().clone();

        let err = engine.refresh(date(2025, 2, 1), false, false).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Fetch(FetchError::ServerError { status: 500, .. })
        ));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_missing_coordinates() {
        let clock = ManualClock::at(2024, 6, 1, 12, 0);
        let mut engine = ScheduleEngine::new(all_years(), clock, Coordinates::default(), false);
        let err = engine.refresh(date(2024, 6, 1), true, true).unwrap_err();
        assert_eq!(err, ScheduleError::ConfigMissing);
        assert_eq!(engine.state().generation, 0);
    }

    #[test]
    fn test_year_table_loaded_once_per_year() {
        let clock = ManualClock::at(2024, 6, 1, 12, 0);
        let source = all_years();
        let mut engine = engine(source.clone(), &clock, false);
        engine.refresh(date(2024, 6, 1), true, true).unwrap();
        engine.refresh(date(2024, 6, 2), false, false).unwrap();
        assert_eq!(source.calls(), 1);

        engine.refresh(date(2025, 1, 5), false, false).unwrap();
        assert_eq!(source.calls(), 2);

        engine.set_coordinates(Coordinates::new("21.42", "39.83"));
        engine.refresh(date(2025, 1, 5), false, false).unwrap();
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn test_select_other_day_turns_relative_off() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, true);
        engine.refresh(date(2024, 1, 1), true, true).unwrap();
        let today_fajr = engine.state().prayer(PrayerName::Fajr).today;

        let state = engine.select_date(date(2024, 2, 10)).unwrap();
        assert!(!state.show_today);
        assert!(!state.relative);
        assert_eq!(state.date, Some(date(2024, 2, 10)));
        assert_eq!(state.current, None);
        assert_eq!(state.order, PrayerName::ALL);
        assert_eq!(state.prayer(PrayerName::Fajr).today, today_fajr);
        assert_eq!(
            state.prayer(PrayerName::Isha).display.unwrap().date_naive(),
            date(2024, 2, 10)
        );
        assert_eq!(engine.selected(), date(2024, 2, 10));

        let state = engine.select_date(date(2024, 1, 1)).unwrap();
        assert!(state.show_today);
        assert_eq!(state.current, Some(PrayerName::Dhuhr));
    }

    #[test]
    fn test_select_other_day_after_moving_reloads_today() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, false);
        engine.refresh(date(2024, 1, 1), true, true).unwrap();

        let mecca = Coordinates::new("21.42", "39.83");
        engine.set_coordinates(mecca.clone());
        let state = engine.select_date(date(2024, 3, 1)).unwrap();
        assert_eq!(state.today_coordinates, Some(mecca));
        assert_eq!(state.today, Some(date(2024, 1, 1)));
        assert_eq!(state.date, Some(date(2024, 3, 1)));
        assert!(!state.show_today);
    }

    #[test]
    fn test_failed_select_keeps_relative_mode() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let source = all_years().failing_year(
            2025,
            FetchError::Unreachable {
                url: "https://example.invalid".to_string(),
                reason: "offline".to_string(),
            },
        );
        let mut engine = engine(source, &clock, true);
        let before = engine.refresh(date(2024, 1, 1), true, true).unwrap().clone();

        assert!(engine.select_date(date(2025, 3, 1)).is_err());
        assert!(engine.relative());
        assert_eq!(engine.selected(), date(2024, 1, 1));
        assert_eq!(engine.state(), &before);

        let state = engine.refresh(date(2024, 1, 1), true, true).unwrap();
        assert!(state.relative);
        assert!(state.rotated);
    }

    #[test]
    fn test_toggle_relative_returns_to_today() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let mut engine = engine(all_years(), &clock, false);
        engine.select_date(date(2024, 1, 20)).unwrap();

        let state = engine.set_relative(true).unwrap();
        assert!(state.show_today);
        assert!(state.rotated);
        assert_eq!(state.date, Some(date(2024, 1, 1)));
    }
}

use chrono::NaiveDate;
use log::{debug, error};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::models::Coordinates;
use crate::prayer_times::clock::Clock;
use crate::prayer_times::error::ScheduleError;
use crate::prayer_times::schedule::{ScheduleEngine, ScheduleState};
use crate::prayer_times::source::YearSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `date: None` refreshes whatever day is currently selected.
    Refresh {
        date: Option<NaiveDate>,
        update_today: bool,
        set_today: bool,
    },
    SelectDate(NaiveDate),
    SetRelative(bool),
    SetCoordinates(Coordinates),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum ScheduleUpdate {
    State(Box<ScheduleState>),
    Failed(ScheduleError),
}

/// Owns the engine on a background thread and runs commands one at a time,
/// so two refreshes never overlap. Every result is handed to `publish`.
pub struct ScheduleWorker {
    tx: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduleWorker {
    pub fn spawn<S, C, F>(engine: ScheduleEngine<S, C>, publish: F) -> Self
    where
        S: YearSource + 'static,
        C: Clock + 'static,
        F: Fn(ScheduleUpdate) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || run(engine, rx, publish));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Returns false once the worker has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn refresh_today(&self) -> bool {
        self.send(Command::Refresh {
            date: None,
            update_today: true,
            set_today: true,
        })
    }

    pub fn select_date(&self, date: NaiveDate) -> bool {
        self.send(Command::SelectDate(date))
    }

    pub fn set_relative(&self, relative: bool) -> bool {
        self.send(Command::SetRelative(relative))
    }

    pub fn set_coordinates(&self, coordinates: Coordinates) -> bool {
        self.send(Command::SetCoordinates(coordinates))
    }
}

impl Drop for ScheduleWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run<S, C, F>(mut engine: ScheduleEngine<S, C>, rx: Receiver<Command>, publish: F)
where
    S: YearSource,
    C: Clock,
    F: Fn(ScheduleUpdate),
{
    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        batch.extend(rx.try_iter());
        batch.dedup();

        for command in batch {
            debug!("Worker command {:?} (relative {})", command, engine.relative());
            let result = match command {
                Command::Shutdown => return,
                Command::SetCoordinates(coordinates) => {
                    engine.set_coordinates(coordinates);
                    continue;
                }
                Command::Refresh {
                    date,
                    update_today,
                    set_today,
                } => {
                    let date = date.unwrap_or_else(|| engine.selected());
                    engine.refresh(date, update_today, set_today)
                }
                Command::SelectDate(date) => engine.select_date(date),
                Command::SetRelative(relative) => engine.set_relative(relative),
            };

            match result {
                Ok(state) => publish(ScheduleUpdate::State(Box::new(state.clone()))),
                Err(e) => {
                    error!("Refresh failed: {}", e);
                    publish(ScheduleUpdate::Failed(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerName;
    use crate::prayer_times::clock::tests::ManualClock;
    use crate::prayer_times::error::FetchError;
    use crate::prayer_times::schedule::tests::{amman, MemorySource};
    use std::time::Duration;

    fn spawn(
        source: MemorySource,
        clock: ManualClock,
    ) -> (ScheduleWorker, Receiver<ScheduleUpdate>) {
        let engine = ScheduleEngine::new(source, clock, amman(), false);
        let (tx, rx) = mpsc::channel();
        let worker = ScheduleWorker::spawn(engine, move |update| {
            let _ = tx.send(update);
        });
        (worker, rx)
    }

    fn next_state(rx: &Receiver<ScheduleUpdate>) -> ScheduleState {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            ScheduleUpdate::State(state) => *state,
            ScheduleUpdate::Failed(e) => panic!("unexpected failure: {}", e),
        }
    }

    #[test]
    fn test_commands_run_in_order_with_rising_generations() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let (worker, rx) = spawn(MemorySource::default().with_year(2024), clock);

        assert!(worker.refresh_today());
        assert!(worker.select_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(worker.set_relative(true));

        let first = next_state(&rx);
        let second = next_state(&rx);
        let third = next_state(&rx);
        assert!(second.is_newer_than(&first));
        assert!(third.is_newer_than(&second));
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(third.show_today);
        assert!(third.rotated);
        assert_eq!(third.order[0], PrayerName::Dhuhr);
    }

    #[test]
    fn test_failure_is_published() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let source = MemorySource::default().failing_year(
            2024,
            FetchError::ServerError {
                status: 500,
                url: "memory://2024".to_string(),
            },
        );
        let (worker, rx) = spawn(source, clock);
        worker.refresh_today();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            ScheduleUpdate::Failed(ScheduleError::Fetch(FetchError::ServerError {
                status, ..
            })) => assert_eq!(status, 500),
            other => panic!("expected a server error, got {:?}", other),
        }
    }

    #[test]
    fn test_coordinates_apply_before_next_refresh() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let (worker, rx) = spawn(MemorySource::default().with_year(2024), clock);
        let mecca = Coordinates::new("21.42", "39.83");
        worker.set_coordinates(mecca.clone());
        worker.refresh_today();

        let state = next_state(&rx);
        assert_eq!(state.coordinates, mecca);
        assert_eq!(state.today_coordinates, Some(mecca));
    }

    #[test]
    fn test_drop_stops_worker() {
        let clock = ManualClock::at(2024, 1, 1, 12, 30);
        let (worker, rx) = spawn(MemorySource::default().with_year(2024), clock);
        drop(worker);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}

pub mod alerts;
pub mod clock;
pub mod error;
pub mod schedule;
pub mod source;
pub mod worker;

pub use alerts::{AlertTracker, LogNotifier, Notification, Notifier};
pub use clock::SystemClock;
pub use error::{FetchError, ScheduleError};
pub use schedule::{ScheduleEngine, ScheduleState};
pub use source::{MoonsightingClient, YearTimeSource};
pub use worker::{ScheduleUpdate, ScheduleWorker};

use std::path::PathBuf;

use crate::models::Coordinates;

/// The engine as the application runs it: cached moonsighting tables and the
/// system clock.
pub type DefaultEngine = ScheduleEngine<YearTimeSource<MoonsightingClient>, SystemClock>;

pub fn default_engine(
    cache_dir: PathBuf,
    coordinates: Coordinates,
    relative: bool,
) -> DefaultEngine {
    let source = YearTimeSource::new(cache_dir, MoonsightingClient::new());
    ScheduleEngine::new(source, SystemClock, coordinates, relative)
}

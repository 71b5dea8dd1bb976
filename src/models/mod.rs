pub mod prayer;

pub use prayer::{Coordinates, DailyTimes, Prayer, PrayerName, YearTable};

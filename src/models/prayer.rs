use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Shuruq,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const COUNT: usize = 6;

    /// Canonical fajr-first order. Indexes into every per-prayer array.
    pub const ALL: [PrayerName; PrayerName::COUNT] = [
        PrayerName::Fajr,
        PrayerName::Shuruq,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn index(self) -> usize {
        match self {
            PrayerName::Fajr => 0,
            PrayerName::Shuruq => 1,
            PrayerName::Dhuhr => 2,
            PrayerName::Asr => 3,
            PrayerName::Maghrib => 4,
            PrayerName::Isha => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Shuruq => "Shuruq",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "'Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "'Isha",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Latitude/longitude exactly as the user typed them. Only compared and used
/// as part of the year cache key, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    pub fn is_set(&self) -> bool {
        !self.latitude.trim().is_empty() && !self.longitude.trim().is_empty()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// One day's six clock times (`H:MM` or `HH:MM`, UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTimes {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl DailyTimes {
    pub fn get(&self, prayer: PrayerName) -> &str {
        match prayer {
            PrayerName::Fajr => &self.fajr,
            PrayerName::Shuruq => &self.sunrise,
            PrayerName::Dhuhr => &self.dhuhr,
            PrayerName::Asr => &self.asr,
            PrayerName::Maghrib => &self.maghrib,
            PrayerName::Isha => &self.isha,
        }
    }

    pub fn map(self, f: impl Fn(String) -> String) -> Self {
        Self {
            fajr: f(self.fajr),
            sunrise: f(self.sunrise),
            dhuhr: f(self.dhuhr),
            asr: f(self.asr),
            maghrib: f(self.maghrib),
            isha: f(self.isha),
        }
    }
}

/// A full year of [`DailyTimes`] for one location. Stored 0-based; lookups take
/// the 1-based day-of-year chrono reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearTable {
    days: Vec<DailyTimes>,
}

impl YearTable {
    pub fn new(days: Vec<DailyTimes>) -> Self {
        Self { days }
    }

    pub fn day(&self, ordinal: u32) -> Option<&DailyTimes> {
        let index = (ordinal as usize).checked_sub(1)?;
        self.days.get(index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// A prayer as shown: the moment it happens on the real current day (used for
/// alerts) and the moment it is displayed against, which relative mode may
/// borrow from a neighbouring day.
#[derive(Debug, Clone, PartialEq)]
pub struct Prayer {
    pub name: PrayerName,
    pub today: Option<DateTime<FixedOffset>>,
    pub today_value: String,
    pub display: Option<DateTime<FixedOffset>>,
    pub display_value: String,
}

impl Prayer {
    pub fn new(name: PrayerName) -> Self {
        Self {
            name,
            today: None,
            today_value: "--:--".to_string(),
            display: None,
            display_value: "--:--".to_string(),
        }
    }
}

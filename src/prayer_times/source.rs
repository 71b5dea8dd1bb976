use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Coordinates, DailyTimes, YearTable};
use crate::prayer_times::error::FetchError;

pub const ENDPOINT: &str = "https://www.moonsighting.com/time_json.php";

/// Fixed calculation method requested from the provider.
const METHOD: u8 = 2;

// ─── Provider wire format ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResponse {
    pub times: Vec<ProviderDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderDay {
    pub times: DailyTimes,
}

/// The remote side of a year fetch.
pub trait TimeTableClient: Send {
    fn fetch(&self, year: i32, coordinates: &Coordinates) -> Result<ProviderResponse, FetchError>;
}

pub struct MoonsightingClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl MoonsightingClient {
    pub fn new() -> Self {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("salawaat/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn url(&self, year: i32, coordinates: &Coordinates) -> String {
        format!(
            "{}?year={}&tz=UTC&lat={}&lon={}&method={}&both=0&time=0",
            self.endpoint, year, coordinates.latitude, coordinates.longitude, METHOD
        )
    }
}

impl Default for MoonsightingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeTableClient for MoonsightingClient {
    fn fetch(&self, year: i32, coordinates: &Coordinates) -> Result<ProviderResponse, FetchError> {
        let url = self.url(year, coordinates);
        debug!("URL {}", url);

        match self.agent.get(&url).call() {
            Ok(response) => {
                debug!("HTTP {}", response.status());
                response
                    .into_json::<ProviderResponse>()
                    .map_err(|e| FetchError::MalformedResponse(e.to_string()))
            }
            Err(ureq::Error::Status(status, _)) => {
                debug!("HTTP {}", status);
                Err(FetchError::ServerError { status, url })
            }
            Err(ureq::Error::Transport(transport)) => Err(FetchError::Unreachable {
                url,
                reason: transport.to_string(),
            }),
        }
    }
}

// ─── Year source ────────────────────────────────────────────────────────────

/// Anything that can hand out a year of prayer times for a location.
pub trait YearSource: Send {
    fn fetch_year(&self, year: i32, coordinates: &Coordinates) -> Result<YearTable, FetchError>;
}

/// Year tables from a per-(year, latitude, longitude) JSON file, falling back to
/// the remote client on a miss. Cache files are never revalidated.
pub struct YearTimeSource<C> {
    cache_dir: PathBuf,
    client: C,
}

impl<C: TimeTableClient> YearTimeSource<C> {
    pub fn new(cache_dir: impl Into<PathBuf>, client: C) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client,
        }
    }

    pub fn cache_path(&self, year: i32, coordinates: &Coordinates) -> PathBuf {
        self.cache_dir.join(cache_file_name(year, coordinates))
    }

    fn read_cache(&self, path: &Path) -> Option<YearTable> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read year cache {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_slice::<YearTable>(&bytes) {
            Ok(table) if !table.is_empty() => Some(table),
            Ok(_) => {
                warn!("Year cache {:?} is empty, refetching", path);
                None
            }
            Err(e) => {
                warn!("Year cache {:?} is corrupt ({}), refetching", path, e);
                None
            }
        }
    }

    /// Best-effort. Written through a temporary file so concurrent readers
    /// never see a partial table.
    fn write_cache(&self, path: &Path, table: &YearTable) {
        let result = (|| -> std::io::Result<()> {
            fs::create_dir_all(&self.cache_dir)?;
            let bytes = serde_json::to_vec(table)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let tmp = self
                .cache_dir
                .join(format!("{}.{}.tmp", file_name, std::process::id()));
            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, path)
        })();

        if let Err(e) = result {
            warn!("Could not write year cache {:?}: {}", path, e);
        }
    }
}

impl<C: TimeTableClient> YearSource for YearTimeSource<C> {
    fn fetch_year(&self, year: i32, coordinates: &Coordinates) -> Result<YearTable, FetchError> {
        debug!("Loading year {}.", year);
        let path = self.cache_path(year, coordinates);
        debug!("path {:?}", path);

        if let Some(table) = self.read_cache(&path) {
            return Ok(table);
        }

        let response = self.client.fetch(year, coordinates)?;
        if response.times.is_empty() {
            return Err(FetchError::MalformedResponse(format!(
                "no days returned for {}",
                year
            )));
        }

        let table = YearTable::new(
            response
                .times
                .into_iter()
                .map(|day| day.times.map(|t| normalize_time(&t)))
                .collect(),
        );
        self.write_cache(&path, &table);
        Ok(table)
    }
}

/// `2024-31.95-35.91`, with path separators made safe.
pub fn cache_file_name(year: i32, coordinates: &Coordinates) -> String {
    format!("{}-{}-{}", year, coordinates.latitude, coordinates.longitude)
        .replace(['/', '\\'], "_")
}

/// Trim trailing whitespace and drop one leading zero: `"05:12 "` becomes `"5:12"`.
pub fn normalize_time(value: &str) -> String {
    let value = value.trim_end();
    value.strip_prefix('0').unwrap_or(value).to_string()
}

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the remote time-table fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Server responded with code {status}. Request URL is {url}.")]
    ServerError { status: u16, url: String },
    #[error("Could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("Unexpected response from the time-table service: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("No coordinates configured. Set a latitude and longitude first.")]
    ConfigMissing,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Year table has no entry for {date}")]
    MissingDay { date: NaiveDate },
    #[error("Bad time value '{value}' in year table")]
    BadTime { value: String },
}

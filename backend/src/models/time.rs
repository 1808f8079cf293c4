use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::{RtmlError, RtmlResult};

/// Timestamp layout expected by `DateTimeStart`/`DateTimeEnd` values.
pub const RTML_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Observing window in UTC. `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> RtmlResult<Self> {
        if end <= start {
            return Err(RtmlError::InvalidRequest(format!(
                "time window end {} is not after start {}",
                end.format(RTML_TIMESTAMP_FORMAT),
                start.format(RTML_TIMESTAMP_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a window from the date (`YYYY-MM-DD`) and time-of-day (`HH:MM`)
    /// strings an observation form collects.
    pub fn from_form_fields(
        start_date: &str,
        start_time: &str,
        end_date: &str,
        end_time: &str,
    ) -> RtmlResult<Self> {
        let start = parse_form_datetime(start_date, start_time)?;
        let end = parse_form_datetime(end_date, end_time)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Render a UTC timestamp the way the remote schema wants it.
pub fn format_rtml_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(RTML_TIMESTAMP_FORMAT).to_string()
}

fn parse_form_datetime(date: &str, time: &str) -> RtmlResult<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| RtmlError::InvalidRequest(format!("invalid date '{}': {}", date, e)))?;
    let time_of_day = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|e| RtmlError::InvalidRequest(format!("invalid time '{}': {}", time, e)))?;
    Ok(Utc.from_utc_datetime(&day.and_time(time_of_day)))
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;

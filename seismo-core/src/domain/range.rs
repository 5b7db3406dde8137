//! Date range parsing
//!
//! Job and query bounds arrive as strings. Dates are read as UTC; a bare end
//! date covers the whole day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Inclusive time range in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("invalid date '{0}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate(String),

    #[error("start '{start}' is after end '{end}'")]
    Inverted { start: String, end: String },
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let start_ms = parse_bound(start, NaiveTime::MIN)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let end_ms = parse_bound(end, end_of_day)?;

        if start_ms > end_ms {
            return Err(DateRangeError::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self { start_ms, end_ms })
    }

    pub fn contains(&self, time_ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&time_ms)
    }
}

/// Parses a date or datetime; a bare date takes `default_time`
fn parse_bound(input: &str, default_time: NaiveTime) -> Result<i64, DateRangeError> {
    let input = input.trim();

    let datetime = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(default_time))
        })
        .ok_or_else(|| DateRangeError::InvalidDate(input.to_string()))?;

    Ok(datetime.and_utc().timestamp_millis())
}

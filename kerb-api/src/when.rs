//! Request date/time resolution against the graph's home timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ParameterError;

/// ISO date-times without a zone; resolved in the graph's home timezone.
const ISO_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S%p", "%I:%M%p", "%I:%M %p"];

/// Resolve the request timestamp from the `date` and `time` parameters.
///
/// A lone `time` may be a full ISO date-time: with an explicit offset it is
/// taken as-is, without one the graph's home timezone is attached. Anything
/// else goes through the lenient per-part format lists; missing parts
/// default to today (in the home zone) and midnight. With neither part the
/// request departs now.
pub fn resolve_date_time(
    date: Option<&str>,
    time: Option<&str>,
    time_zone: Tz,
    now: DateTime<Utc>,
) -> Result<i64, ParameterError> {
    if date.is_none() {
        if let Some(time) = time {
            if let Ok(instant) = DateTime::parse_from_rfc3339(time) {
                return Ok(instant.timestamp());
            }
            for format in ISO_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(time, format) {
                    return local_timestamp(naive, time_zone);
                }
            }
        } else {
            return Ok(now.timestamp());
        }
    }

    let local_date = match date {
        Some(date) => parse_date(date)?,
        None => now.with_timezone(&time_zone).date_naive(),
    };
    let local_time = match time {
        Some(time) => parse_time(time)?,
        None => NaiveTime::MIN,
    };
    local_timestamp(local_date.and_time(local_time), time_zone)
}

fn local_timestamp(naive: NaiveDateTime, time_zone: Tz) -> Result<i64, ParameterError> {
    // Spring-forward gaps have no local representation; ambiguous
    // fall-back times take the earlier instant.
    time_zone
        .from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.timestamp())
        .ok_or_else(|| ParameterError::UnparseableDateTime(naive.to_string()))
}

fn parse_date(input: &str) -> Result<NaiveDate, ParameterError> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(date);
        }
    }
    Err(ParameterError::UnparseableDateTime(input.to_owned()))
}

fn parse_time(input: &str) -> Result<NaiveTime, ParameterError> {
    let trimmed = input.trim();
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
        // Accept lowercase meridiems too.
        if let Ok(time) = NaiveTime::parse_from_str(&trimmed.to_ascii_uppercase(), format) {
            return Ok(time);
        }
    }
    Err(ParameterError::UnparseableDateTime(input.to_owned()))
}

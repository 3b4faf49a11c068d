// Outage duration from raw clock strings.
//
// Accepted clock forms: `HH:MM`, `HH.MM`, `HHMM`, `HMM` and a bare hour
// (`8`, `14`). The literal `Unknown` on either side makes the record
// unusable for duration reports. Times are naive local wall-clock values.
use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::error::{OutageError, Result};
use crate::types::OutageRecord;

pub const UNKNOWN_MARKER: &str = "Unknown";

/// Parse one raw clock string into a time of day.
pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    let malformed = || OutageError::MalformedTime(raw.to_string());
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(UNKNOWN_MARKER) {
        return Err(malformed());
    }

    let digits: String = s.chars().filter(|c| *c != ':' && *c != '.').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    // Bare hour `8` -> `0800`, `830` -> `0830`.
    let padded = if digits.len() <= 2 {
        format!("{:0>2}00", digits)
    } else {
        format!("{:0>4}", digits)
    };
    let (hour, minute) = padded.split_at(2);
    hm_to_time(hour, minute).ok_or_else(malformed)
}

fn hm_to_time(hour: &str, minute: &str) -> Option<NaiveTime> {
    let h: u32 = hour.parse().ok()?;
    let m: u32 = minute.parse().ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Elapsed hours between two clock strings on the given calendar date.
///
/// An end earlier than the start is an overnight outage: 24 hours are added
/// to the difference, the date itself is not advanced.
pub fn duration_between(year: i32, month: i32, day: i32, start_raw: &str, end_raw: &str) -> Result<f64> {
    let start = parse_clock(start_raw)?;
    let end = parse_clock(end_raw)?;

    let invalid_date = || OutageError::InvalidDate { year, month, day };
    // chrono accepts year 0 and below as proleptic dates.
    if year <= 0 {
        return Err(invalid_date());
    }
    let m = u32::try_from(month).map_err(|_| invalid_date())?;
    let d = u32::try_from(day).map_err(|_| invalid_date())?;
    let date = NaiveDate::from_ymd_opt(year, m, d).ok_or_else(invalid_date)?;

    let mut elapsed = date.and_time(end) - date.and_time(start);
    if elapsed < TimeDelta::zero() {
        elapsed += TimeDelta::hours(24);
    }
    Ok(elapsed.num_seconds() as f64 / 3600.0)
}

pub fn duration_hours(record: &OutageRecord) -> Result<f64> {
    duration_between(
        record.year,
        record.month,
        record.day,
        &record.time_start_raw,
        &record.time_end_raw,
    )
}

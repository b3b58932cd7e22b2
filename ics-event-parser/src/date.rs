//! ICS date value parsing
//!
//! Selects one of three encodings from the shape of the raw value and turns it
//! into a local wall-clock [`Timestamp`]:
//! - trailing `Z`: UTC instant, converted to the local system zone
//! - contains `T`: floating local date-time, no conversion
//! - otherwise: all-day date, local midnight
//!
//! The shape is checked character by character before chrono is asked to
//! interpret it, so values like `2024-03-15` or `2024031` are rejected rather
//! than leniently accepted.

use crate::types::{DateFormatError, DateShape, Timestamp};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const UTC_MARKER: char = 'Z';
const TIME_SEPARATOR: char = 'T';

/// Parse a raw ICS date value into a local timestamp
pub fn parse_ics_date(value: &str) -> Result<Timestamp, DateFormatError> {
    match classify(value) {
        DateShape::Utc => parse_utc(value),
        DateShape::Local => parse_local(value),
        DateShape::AllDay => parse_all_day(value),
    }
}

/// Pick the encoding a value claims to be in
pub fn classify(value: &str) -> DateShape {
    if value.ends_with(UTC_MARKER) {
        DateShape::Utc
    } else if value.contains(TIME_SEPARATOR) {
        DateShape::Local
    } else {
        DateShape::AllDay
    }
}

fn parse_utc(value: &str) -> Result<Timestamp, DateFormatError> {
    let shape = DateShape::Utc;
    let body = value
        .strip_suffix(UTC_MARKER)
        .ok_or_else(|| format_error(value, shape))?;
    let naive = parse_date_time(body).ok_or_else(|| format_error(value, shape))?;

    Ok(Utc.from_utc_datetime(&naive).with_timezone(&Local).naive_local())
}

fn parse_local(value: &str) -> Result<Timestamp, DateFormatError> {
    parse_date_time(value).ok_or_else(|| format_error(value, DateShape::Local))
}

fn parse_all_day(value: &str) -> Result<Timestamp, DateFormatError> {
    parse_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format_error(value, DateShape::AllDay))
}

/// `YYYYMMDDTHHMMSS`
fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let (date, time) = value.split_once(TIME_SEPARATOR)?;
    if !is_digits(time, 6) {
        return None;
    }
    let date = parse_date(date)?;

    let hour = time[0..2].parse().ok()?;
    let minute = time[2..4].parse().ok()?;
    let second = time[4..6].parse().ok()?;
    date.and_hms_opt(hour, minute, second)
}

/// `YYYYMMDD`
fn parse_date(value: &str) -> Option<NaiveDate> {
    if !is_digits(value, 8) {
        return None;
    }

    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

fn format_error(value: &str, expected: DateShape) -> DateFormatError {
    DateFormatError {
        value: value.to_string(),
        expected,
    }
}

//! Conversion of flexible timestamp inputs into the provider's compact UTC format.
//!
//! The provider expects `periodStart`/`periodEnd` as `YYYYMMDDHHmm` in UTC. Callers may
//! hand in dates, naive date-times, UTC instants or strings; naive values are read in a
//! configurable source timezone (CET by default) so the result never depends on the
//! local timezone of the machine running the query.

use crate::constants::COMPACT_TIMESTAMP_FORMAT;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A timestamp as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    /// Calendar date, interpreted as local midnight in the source timezone
    Date(NaiveDate),
    /// Wall-clock date-time in the source timezone
    DateTime(NaiveDateTime),
    /// An unambiguous instant
    Utc(DateTime<Utc>),
    /// Free text: compact `YYYYMMDDHHmm` (UTC), RFC 3339, `YYYY-MM-DD[ HH:MM[:SS]]`
    Text(String),
}

impl From<NaiveDate> for TimeInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Utc(value)
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Formats a timestamp input as `YYYYMMDDHHmm` in UTC.
///
/// # Errors
///
/// - `MissingInputError` when `input` is `None`
/// - `InvalidRangeError` when the text cannot be interpreted or the local time does not
///   exist in `source_tz` (spring-forward gap)
pub fn format_timestamp(input: Option<&TimeInput>, source_tz: Tz) -> AppResult<String> {
    let instant = resolve_timestamp(input, source_tz)?;
    Ok(instant.format(COMPACT_TIMESTAMP_FORMAT).to_string())
}

/// Resolves a timestamp input to a UTC instant.
pub fn resolve_timestamp(input: Option<&TimeInput>, source_tz: Tz) -> AppResult<DateTime<Utc>> {
    let input = input.ok_or_else(|| AppError::MissingInputError("timestamp".to_string()))?;

    match input {
        TimeInput::Utc(instant) => Ok(*instant),
        TimeInput::DateTime(naive) => localize(naive, source_tz),
        TimeInput::Date(date) => localize(&midnight(date), source_tz),
        TimeInput::Text(text) => parse_text(text.trim(), source_tz),
    }
}

fn parse_text(text: &str, source_tz: Tz) -> AppResult<DateTime<Utc>> {
    if text.is_empty() {
        return Err(AppError::MissingInputError("timestamp".to_string()));
    }

    // Already in provider form, which is UTC by definition
    if text.len() == 12 && text.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDateTime::parse_from_str(text, COMPACT_TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| invalid_timestamp(text));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(&naive, source_tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return localize(&midnight(&date), source_tz);
    }

    Err(invalid_timestamp(text))
}

fn midnight(date: &NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Attaches `tz` to a wall-clock time. Ambiguous times take the earlier instant.
fn localize(naive: &NaiveDateTime, tz: Tz) -> AppResult<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(AppError::InvalidRangeError(format!(
            "Local time {naive} does not exist in timezone {}",
            tz.name()
        ))),
    }
}

fn invalid_timestamp(text: &str) -> AppError {
    AppError::InvalidRangeError(format!("Cannot interpret timestamp: {text}"))
}

use crate::constants::RESOLUTION_REGEX_PATTERN;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Months, Utc};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Cached regex for ISO-8601 resolution strings.
static RESOLUTION_REGEX: OnceLock<Regex> = OnceLock::new();

/// Time step between consecutive points of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Months(u32),
    Years(u32),
}

impl FromStr for Resolution {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        let unsupported = || AppError::UnsupportedResolutionError(value.to_string());
        let regex = RESOLUTION_REGEX.get_or_init(|| {
            Regex::new(RESOLUTION_REGEX_PATTERN)
                .expect("RESOLUTION_REGEX_PATTERN is a valid regex pattern")
        });
        let captures = regex.captures(value.trim()).ok_or_else(unsupported)?;

        // Date part: P{n}D / P{n}M / P{n}Y; time part: PT{n}M / PT{n}H
        let (amount, unit, is_time) = match (captures.get(1), captures.get(3)) {
            (Some(amount), _) => (amount.as_str(), &captures[2], false),
            (None, Some(amount)) => (amount.as_str(), &captures[4], true),
            (None, None) => return Err(unsupported()),
        };
        let amount: u32 = amount.parse().map_err(|_| unsupported())?;
        if amount == 0 {
            return Err(unsupported());
        }

        Ok(match (is_time, unit) {
            (true, "M") => Self::Minutes(amount),
            (true, "H") => Self::Hours(amount),
            (false, "D") => Self::Days(amount),
            (false, "M") => Self::Months(amount),
            (false, "Y") => Self::Years(amount),
            _ => return Err(unsupported()),
        })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(n) => write!(f, "PT{n}M"),
            Self::Hours(n) => write!(f, "PT{n}H"),
            Self::Days(n) => write!(f, "P{n}D"),
            Self::Months(n) => write!(f, "P{n}M"),
            Self::Years(n) => write!(f, "P{n}Y"),
        }
    }
}

impl Resolution {
    /// Returns `start` advanced by `steps` resolution units.
    ///
    /// Month and year steps are calendar-based; the rest are fixed durations in UTC.
    pub fn advance(&self, start: DateTime<Utc>, steps: u32) -> AppResult<DateTime<Utc>> {
        let overflow = || {
            AppError::MalformedResponseError(format!(
                "Timestamp overflow advancing {start} by {steps} x {self}"
            ))
        };
        let scaled = |n: u32| n.checked_mul(steps).ok_or_else(overflow);

        let result = match self {
            Self::Minutes(n) => start.checked_add_signed(Duration::minutes(i64::from(scaled(*n)?))),
            Self::Hours(n) => start.checked_add_signed(Duration::hours(i64::from(scaled(*n)?))),
            Self::Days(n) => start.checked_add_signed(Duration::days(i64::from(scaled(*n)?))),
            Self::Months(n) => start.checked_add_months(Months::new(scaled(*n)?)),
            Self::Years(n) => {
                let months = scaled(*n)?.checked_mul(12).ok_or_else(overflow)?;
                start.checked_add_months(Months::new(months))
            }
        };
        result.ok_or_else(overflow)
    }
}

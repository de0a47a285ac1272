//! Unix-time conversion and business-day arithmetic on naive timestamps.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Utc, Weekday};

use crate::constants::dates::{BUSINESS_DAYS_PER_WEEK, DAYS_PER_WEEK, SECONDS_PER_DAY};
use crate::errors::ExtractError;
use crate::types::UnixSeconds;

fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

/// Seconds since `1970-01-01T00:00:00`, truncated toward zero.
pub fn unix_time(time: NaiveDateTime) -> UnixSeconds {
    time.signed_duration_since(epoch()).num_seconds()
}

/// Timestamp `seconds` after the epoch; `None` when outside chrono's range.
pub fn from_unix_seconds(seconds: UnixSeconds) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|time| time.naive_utc())
}

/// Parse a decimal seconds string, falling back to the epoch.
///
/// ```
/// use featurekit::dates::{parse_unix_seconds, unix_time};
///
/// assert_eq!(unix_time(parse_unix_seconds(" 86400 ")), 86_400);
/// assert_eq!(unix_time(parse_unix_seconds("soon")), 0);
/// ```
pub fn parse_unix_seconds(value: &str) -> NaiveDateTime {
    value
        .trim()
        .parse::<UnixSeconds>()
        .ok()
        .and_then(from_unix_seconds)
        .unwrap_or_else(epoch)
}

/// Return `true` for Saturday and Sunday.
pub fn is_weekend(time: NaiveDateTime) -> bool {
    matches!(time.weekday(), Weekday::Sat | Weekday::Sun)
}

fn shift_days(time: NaiveDateTime, days: i64) -> Result<NaiveDateTime, ExtractError> {
    TimeDelta::try_days(days)
        .and_then(|delta| time.checked_add_signed(delta))
        .ok_or(ExtractError::DateOutOfRange)
}

/// Move `days` business days forward from `start`.
///
/// A weekend start first rolls to Monday, which consumes one of the days.
/// Zero days returns `start` unchanged, weekend or not.
pub fn add_business_days(start: NaiveDateTime, days: i64) -> Result<NaiveDateTime, ExtractError> {
    if days < 0 {
        return Err(ExtractError::NegativeDayCount(days));
    }
    if days == 0 {
        return Ok(start);
    }

    let (mut current, mut remaining) = match start.weekday() {
        Weekday::Sat => (shift_days(start, 2)?, days - 1),
        Weekday::Sun => (shift_days(start, 1)?, days - 1),
        _ => (start, days),
    };

    let whole_weeks = (remaining / BUSINESS_DAYS_PER_WEEK)
        .checked_mul(DAYS_PER_WEEK)
        .ok_or(ExtractError::DateOutOfRange)?;
    current = shift_days(current, whole_weeks)?;
    remaining %= BUSINESS_DAYS_PER_WEEK;

    if i64::from(current.weekday().num_days_from_sunday()) + remaining > BUSINESS_DAYS_PER_WEEK {
        remaining += 2;
    }
    shift_days(current, remaining)
}

/// Inclusive count of business days from `start` to `end`.
///
/// Fractional when the two timestamps differ in time of day.
///
/// ```
/// use chrono::NaiveDate;
/// use featurekit::dates::business_days_between;
///
/// let friday = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(business_days_between(friday, monday), 2.0);
/// ```
pub fn business_days_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let span = end.signed_duration_since(start);
    let total_days = span.num_milliseconds() as f64 / 1_000.0 / SECONDS_PER_DAY;
    let start_dow = f64::from(start.weekday().num_days_from_sunday());
    let end_dow = f64::from(end.weekday().num_days_from_sunday());

    let mut business_days = 1.0
        + (total_days * BUSINESS_DAYS_PER_WEEK as f64 - (start_dow - end_dow) * 2.0)
            / DAYS_PER_WEEK as f64;
    if end.weekday() == Weekday::Sat {
        business_days -= 1.0;
    }
    if start.weekday() == Weekday::Sun {
        business_days -= 1.0;
    }
    business_days
}

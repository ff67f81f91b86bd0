//! Conversions between host dates/times and R's numeric encodings.
//!
//! R stores `Date` as days since 1970-01-01 and `POSIXct` as seconds since
//! the epoch, both as doubles.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use rtable_foundation::{DateTimeKind, Temporal};

use crate::header::na_real;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days from 0001-01-01 (day 1 of the common era) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Largest magnitude accepted when turning a double into a date or time.
const MAX_ABS_DAYS: f64 = 100_000_000.0;
const MAX_ABS_SECONDS: f64 = MAX_ABS_DAYS * SECONDS_PER_DAY;

fn epoch_seconds(seconds: i64, nanos: u32) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let whole = seconds as f64;
    whole + f64::from(nanos) / 1e9
}

fn epoch_days(date: NaiveDate) -> f64 {
    let midnight = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    midnight.map_or_else(na_real, |dt| {
        epoch_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()) / SECONDS_PER_DAY
    })
}

/// Encodes one value as the double R would store for its kind.
///
/// Day-granular kinds become epoch days (of the period's first day),
/// time-of-day becomes seconds since midnight and datetimes become epoch
/// seconds with a fractional part.
#[must_use]
pub fn to_r_double(value: &Temporal) -> f64 {
    match value {
        Temporal::Date(_) | Temporal::YearMonth { .. } | Temporal::Year(_) => {
            value.first_day().map_or_else(na_real, epoch_days)
        }
        Temporal::TimeOfDay(t) => {
            f64::from(t.num_seconds_from_midnight()) + f64::from(t.nanosecond()) / 1e9
        }
        Temporal::DateTime(dt) => {
            let utc = dt.and_utc();
            epoch_seconds(utc.timestamp(), utc.timestamp_subsec_nanos())
        }
        Temporal::Zoned(dt) => epoch_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()),
    }
}

/// Encodes an optional value, absent becoming NA.
#[must_use]
pub fn to_r_double_opt(value: Option<&Temporal>) -> f64 {
    value.map_or_else(na_real, to_r_double)
}

/// Decodes epoch days as a date. Fractional days are floored.
#[must_use]
pub fn date_from_r_days(days: f64) -> Option<Temporal> {
    if !days.is_finite() || days.abs() > MAX_ABS_DAYS {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let days = days.floor() as i64;
    let from_ce = i32::try_from(days + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(from_ce).map(Temporal::Date)
}

fn instant_from_r_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds.abs() > MAX_ABS_SECONDS {
        return None;
    }
    let whole = seconds.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut nanos = ((seconds - whole) * 1e9).round() as u32;
    #[allow(clippy::cast_possible_truncation)]
    let mut whole = whole as i64;
    if nanos >= 1_000_000_000 {
        whole += 1;
        nanos = 0;
    }
    DateTime::from_timestamp(whole, nanos)
}

/// Decodes epoch seconds as a datetime, zoned (at UTC) or local.
#[must_use]
pub fn datetime_from_r_seconds(seconds: f64, zoned: bool) -> Option<Temporal> {
    let instant = instant_from_r_seconds(seconds)?;
    Some(if zoned {
        Temporal::Zoned(instant.with_timezone(&FixedOffset::east_opt(0)?))
    } else {
        Temporal::DateTime(instant.naive_utc())
    })
}

/// Decodes one double of the given kind. NA and out-of-range values decode
/// as `None`.
#[must_use]
pub fn from_r_double(kind: DateTimeKind, x: f64) -> Option<Temporal> {
    match kind {
        DateTimeKind::YearMonthDay => date_from_r_days(x),
        DateTimeKind::YearMonth => match date_from_r_days(x)? {
            Temporal::Date(d) => Some(rtable_foundation::temporal::year_month_of(d)),
            _ => None,
        },
        DateTimeKind::Year => match date_from_r_days(x)? {
            Temporal::Date(d) => Some(Temporal::Year(chrono::Datelike::year(&d))),
            _ => None,
        },
        DateTimeKind::TimeOfDay => {
            let instant = instant_from_r_seconds(x.rem_euclid(SECONDS_PER_DAY))?;
            Some(Temporal::TimeOfDay(instant.time()))
        }
        DateTimeKind::DateTime => datetime_from_r_seconds(x, false),
        DateTimeKind::DateTimeZoned => datetime_from_r_seconds(x, true),
    }
}

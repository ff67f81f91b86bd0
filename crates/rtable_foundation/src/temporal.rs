//! Date and time values.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The granularity and shape of a date/time column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DateTimeKind {
    /// A calendar date.
    YearMonthDay,
    /// A year and month.
    YearMonth,
    /// A year.
    Year,
    /// A time of day without a date.
    TimeOfDay,
    /// A local date and time without a zone.
    DateTime,
    /// A date and time with a UTC offset.
    DateTimeZoned,
}

impl DateTimeKind {
    /// Returns true for kinds whose smallest unit is a day or coarser.
    #[must_use]
    pub const fn is_day_granular(self) -> bool {
        matches!(self, Self::YearMonthDay | Self::YearMonth | Self::Year)
    }

    /// Returns true for kinds that carry both a date and a time.
    #[must_use]
    pub const fn is_date_time(self) -> bool {
        matches!(self, Self::DateTime | Self::DateTimeZoned)
    }

    /// Returns a short lowercase name for display.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::YearMonthDay => "date",
            Self::YearMonth => "year-month",
            Self::Year => "year",
            Self::TimeOfDay => "time",
            Self::DateTime => "datetime",
            Self::DateTimeZoned => "zoned-datetime",
        }
    }
}

impl fmt::Display for DateTimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single date/time value.
///
/// The variant always agrees with one [`DateTimeKind`], see [`Temporal::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Temporal {
    /// A calendar date.
    Date(NaiveDate),
    /// A year and month (month is 1-based).
    YearMonth {
        /// Calendar year.
        year: i32,
        /// Month, 1 to 12.
        month: u32,
    },
    /// A year.
    Year(i32),
    /// A time of day.
    TimeOfDay(NaiveTime),
    /// A local date and time.
    DateTime(NaiveDateTime),
    /// A date and time with offset.
    Zoned(DateTime<FixedOffset>),
}

impl Temporal {
    /// Returns the kind this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> DateTimeKind {
        match self {
            Self::Date(_) => DateTimeKind::YearMonthDay,
            Self::YearMonth { .. } => DateTimeKind::YearMonth,
            Self::Year(_) => DateTimeKind::Year,
            Self::TimeOfDay(_) => DateTimeKind::TimeOfDay,
            Self::DateTime(_) => DateTimeKind::DateTime,
            Self::Zoned(_) => DateTimeKind::DateTimeZoned,
        }
    }

    /// Returns the first calendar day covered by a day-granular value.
    ///
    /// Returns `None` for time-of-day and datetime values, and for
    /// year/month combinations chrono cannot represent.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::YearMonth { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1),
            Self::Year(year) => NaiveDate::from_ymd_opt(*year, 1, 1),
            Self::TimeOfDay(_) | Self::DateTime(_) | Self::Zoned(_) => None,
        }
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::YearMonth { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Year(year) => write!(f, "{year:04}"),
            Self::TimeOfDay(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<NaiveDate> for Temporal {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveTime> for Temporal {
    fn from(t: NaiveTime) -> Self {
        Self::TimeOfDay(t)
    }
}

impl From<DateTime<FixedOffset>> for Temporal {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Zoned(dt)
    }
}

/// Builds a year-month value from a date, discarding the day.
#[must_use]
pub fn year_month_of(date: NaiveDate) -> Temporal {
    Temporal::YearMonth {
        year: date.year(),
        month: date.month(),
    }
}

/// Calendar helpers built around the `YYYY-MM-DD` date key
///
/// Every day in the system is a local calendar day. Keys are produced from
/// the local calendar fields of a date, never through a UTC conversion, so a
/// user east of UTC logging late at night lands on the right day.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Weekday};

use crate::domain::DomainError;

/// chrono format string for a date key
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar date as a `YYYY-MM-DD` key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Date key of an instant, using the calendar fields of its own time zone
pub fn instant_date_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    date_key(instant.date_naive())
}

/// Today's date in the machine's local time zone
///
/// Only the outer layers call this; engines receive an explicit `as_of`.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Strip any time component from a key (`2024-03-01T10:00:00Z` -> `2024-03-01`)
fn normalize_key(key: &str) -> &str {
    key.split('T').next().unwrap_or(key).trim()
}

/// Parse a date key, tolerating a trailing time component
pub fn parse_date_key(key: &str) -> Result<NaiveDate, DomainError> {
    let normalized = normalize_key(key);
    NaiveDate::parse_from_str(normalized, DATE_KEY_FORMAT).map_err(|_| {
        DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", key))
    })
}

/// Check whether a date key lies inside `[start, end]`, with `end` open when absent
///
/// Plain string comparison is enough because every key has the same
/// fixed-width layout.
pub fn in_range(date_key: &str, start: &str, end: Option<&str>) -> bool {
    let day = normalize_key(date_key);
    if day < normalize_key(start) {
        return false;
    }
    match end {
        Some(end) => day <= normalize_key(end),
        None => true,
    }
}

/// Iterate every day of the inclusive range `[start, end]`
///
/// Yields nothing when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Number of days in the inclusive range `[start, end]`, 0 when empty
pub fn day_count(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        0
    } else {
        ((end - start).num_days() + 1) as u32
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// January 1st of the year containing `date`
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Weekdays in presentation order, Monday first
pub const WEEKDAYS_MONDAY_FIRST: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Full English name of a month (1-based)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

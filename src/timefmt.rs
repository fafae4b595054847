//! Wall-clock helpers over epoch milliseconds, in the local time zone.
//!
//! Patterns are chrono `strftime` strings. An invalid pattern formats to an
//! empty string and parses to nothing; no function here panics on bad input.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use std::fmt::Write;

pub const DEFAULT_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

const ZODIAC_SIGNS: [&str; 12] = [
    "Aquarius",
    "Pisces",
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
];

/// Day of the month on which each month's sign begins (January = Aquarius).
const ZODIAC_START_DAYS: [u32; 12] = [20, 19, 21, 20, 21, 22, 23, 23, 23, 24, 23, 22];

const CHINESE_ZODIAC: [&str; 12] = [
    "Rat", "Ox", "Tiger", "Rabbit", "Dragon", "Snake", "Horse", "Goat", "Monkey", "Rooster", "Dog",
    "Pig",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn millis(self) -> i64 {
        match self {
            TimeUnit::Millis => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        }
    }
}

fn items(pattern: &str) -> Option<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        None
    } else {
        Some(items)
    }
}

pub fn from_millis(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

pub fn format_date(date: &DateTime<Local>, pattern: &str) -> String {
    let Some(items) = items(pattern) else {
        return String::new();
    };
    let mut out = String::new();
    match write!(out, "{}", date.format_with_items(items.into_iter())) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}

pub fn millis_to_string(millis: i64, pattern: &str) -> String {
    from_millis(millis)
        .map(|date| format_date(&date, pattern))
        .unwrap_or_default()
}

pub fn now_string(pattern: &str) -> String {
    format_date(&Local::now(), pattern)
}

/// Parses `text`; patterns without a time of day parse as midnight.
pub fn string_to_date(text: &str, pattern: &str) -> Option<DateTime<Local>> {
    items(pattern)?;
    let naive = NaiveDateTime::parse_from_str(text, pattern)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Local.from_local_datetime(&naive).earliest()
}

/// Epoch millis of `text`, or 0 when it does not parse.
pub fn string_to_millis(text: &str, pattern: &str) -> i64 {
    string_to_date(text, pattern)
        .map(|date| date.timestamp_millis())
        .unwrap_or(0)
}

pub fn time_span(start_millis: i64, end_millis: i64, unit: TimeUnit) -> i64 {
    end_millis.saturating_sub(start_millis) / unit.millis()
}

pub fn time_span_by_now(millis: i64, unit: TimeUnit) -> i64 {
    time_span(millis, now_millis(), unit)
}

/// Absolute span in the largest whole unit up to days: `42s`, `5min`, `3h`, `2d`.
pub fn fit_time_span(start_millis: i64, end_millis: i64) -> String {
    let span = end_millis.saturating_sub(start_millis).unsigned_abs();
    match span {
        s if s < 60_000 => format!("{}s", s / 1_000),
        s if s < 3_600_000 => format!("{}min", s / 60_000),
        s if s < 86_400_000 => format!("{}h", s / 3_600_000),
        s => format!("{}d", s / 86_400_000),
    }
}

/// Like `fit_time_span`, continuing with weeks, 30-day months and 365-day years.
pub fn fit_time_span_long(start_millis: i64, end_millis: i64) -> String {
    let span = end_millis.saturating_sub(start_millis).unsigned_abs();
    match span {
        s if s < 604_800_000 => fit_time_span(0, s as i64),
        s if s < 2_592_000_000 => format!("{}w", s / 604_800_000),
        s if s < 31_536_000_000 => format!("{}mo", s / 2_592_000_000),
        s => format!("{}y", s / 31_536_000_000),
    }
}

pub fn is_today(millis: i64) -> bool {
    from_millis(millis).is_some_and(|date| date.date_naive() == Local::now().date_naive())
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn weekday_name(millis: i64) -> &'static str {
    match from_millis(millis).map(|date| date.weekday()) {
        Some(Weekday::Mon) => "Monday",
        Some(Weekday::Tue) => "Tuesday",
        Some(Weekday::Wed) => "Wednesday",
        Some(Weekday::Thu) => "Thursday",
        Some(Weekday::Fri) => "Friday",
        Some(Weekday::Sat) => "Saturday",
        Some(Weekday::Sun) => "Sunday",
        None => "",
    }
}

pub fn is_am(millis: i64) -> bool {
    from_millis(millis).is_some_and(|date| date.hour() < 12)
}

pub fn is_pm(millis: i64) -> bool {
    !is_am(millis)
}

pub fn chinese_zodiac(millis: i64) -> &'static str {
    from_millis(millis)
        .map(|date| CHINESE_ZODIAC[(date.year() - 4).rem_euclid(12) as usize])
        .unwrap_or("")
}

/// Western zodiac sign of the date.
pub fn zodiac_sign(millis: i64) -> &'static str {
    let Some(date) = from_millis(millis) else {
        return "";
    };
    let month = date.month0() as usize;
    if date.day() >= ZODIAC_START_DAYS[month] {
        ZODIAC_SIGNS[month]
    } else {
        ZODIAC_SIGNS[(month + 11) % 12]
    }
}

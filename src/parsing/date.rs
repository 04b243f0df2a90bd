//! Best-effort extraction of a civil date from free text.
//!
//! Forms are tried in a fixed order and the first one that resolves to a real
//! calendar date wins:
//!
//! 1. ISO dates (`2024-03-01`, `2024/03/01`)
//! 2. Month name then day (`Dec 25`, `March 1st, 2024`)
//! 3. Day then month name (`25 December 2024`)
//! 4. Numeric month/day (`3/4`, `3/4/24`), always month first
//! 5. `today`, `tonight`, `tomorrow`
//! 6. `in N days`, `in N weeks`
//! 7. Weekday names, optionally after `next` or `this`
//!
//! Dates without a year land on the current year, or the next one when they
//! are already past. Weekdays always land strictly after today.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::trace;

const MONTH_NAMES: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

lazy_static! {
    static ref ISO_DATE: Regex =
        Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:\D|$)").unwrap();
    static ref MONTH_DAY: Regex = Regex::new(&format!(
        r"(?i)\b({MONTH_NAMES})\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap();
    static ref DAY_MONTH: Regex = Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_NAMES})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap();
    static ref NUMERIC_DATE: Regex =
        Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap();
    static ref RELATIVE_DAY: Regex = Regex::new(r"(?i)\b(today|tonight|tomorrow)\b").unwrap();
    static ref IN_N_DAYS: Regex = Regex::new(r"(?i)\bin\s+(\d{1,3})\s+(day|week)s?\b").unwrap();
    static ref WEEKDAY: Regex = Regex::new(
        r"(?i)\b(?:(?:next|this)\s+)?(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun)\b"
    )
    .unwrap();
}

type Resolver = fn(&str, NaiveDate) -> Option<NaiveDate>;

const RESOLVERS: [Resolver; 7] = [
    resolve_iso,
    resolve_month_day,
    resolve_day_month,
    resolve_numeric,
    resolve_relative_day,
    resolve_in_n_days,
    resolve_weekday,
];

/// Parses `text` against today's local civil date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_date_relative_to(text, Local::now().date_naive())
}

pub fn parse_date_relative_to(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let date = RESOLVERS.iter().find_map(|resolve| resolve(text, today));

    if date.is_none() {
        trace!("No date found in '{}'", text);
    }

    date
}

/// Next occurrence of `weekday` strictly after `today`.
///
/// When today already is that weekday, the result is one week ahead.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut days_ahead =
        weekday.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64;

    if days_ahead <= 0 {
        days_ahead += 7;
    }

    today + Days::new(days_ahead as u64)
}

fn resolve_iso(text: &str, _today: NaiveDate) -> Option<NaiveDate> {
    ISO_DATE.captures_iter(text).find_map(|captures| {
        NaiveDate::from_ymd_opt(
            number(&captures, 1)? as i32,
            number(&captures, 2)?,
            number(&captures, 3)?,
        )
    })
}

fn resolve_month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    MONTH_DAY.captures_iter(text).find_map(|captures| {
        let month = month_from_name(&captures[1])?;
        let day = number(&captures, 2)?;

        resolve_with_optional_year(today, number(&captures, 3), month, day)
    })
}

fn resolve_day_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    DAY_MONTH.captures_iter(text).find_map(|captures| {
        let day = number(&captures, 1)?;
        let month = month_from_name(&captures[2])?;

        resolve_with_optional_year(today, number(&captures, 3), month, day)
    })
}

fn resolve_numeric(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    NUMERIC_DATE.captures_iter(text).find_map(|captures| {
        let month = number(&captures, 1)?;
        let day = number(&captures, 2)?;
        let year = captures.get(3).and_then(|year| {
            let value: u32 = year.as_str().parse().ok()?;
            Some(if year.as_str().len() == 2 { 2000 + value } else { value })
        });

        resolve_with_optional_year(today, year, month, day)
    })
}

fn resolve_relative_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = RELATIVE_DAY.captures(text)?;

    match captures[1].to_lowercase().as_str() {
        "tomorrow" => today.succ_opt(),
        _ => Some(today),
    }
}

fn resolve_in_n_days(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = IN_N_DAYS.captures(text)?;
    let amount: u64 = captures[1].parse().ok()?;
    let days = match captures[2].to_lowercase().as_str() {
        "week" => amount * 7,
        _ => amount,
    };

    today.checked_add_days(Days::new(days))
}

fn resolve_weekday(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = WEEKDAY.captures(text)?;
    let weekday = weekday_from_name(&captures[1])?;

    Some(next_weekday(today, weekday))
}

fn resolve_with_optional_year(
    today: NaiveDate,
    year: Option<u32>,
    month: u32,
    day: u32,
) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year as i32, month, day),
        None => match NaiveDate::from_ymd_opt(today.year(), month, day) {
            Some(date) if date >= today => Some(date),
            _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
        },
    }
}

fn number(captures: &Captures, index: usize) -> Option<u32> {
    captures.get(index)?.as_str().parse().ok()
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.get(..3)?.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };

    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.get(..3)?.to_lowercase().as_str() {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };

    Some(weekday)
}

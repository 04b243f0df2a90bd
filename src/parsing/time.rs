use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::trace;

lazy_static! {
    /// Most specific first. Only the first pattern that matches is resolved.
    /// A match may touch letters but not digits, so `2024-03-05T19:30Z` still matches.
    static ref TIME_PATTERNS: [(Regex, ClockForm); 3] = [
        (
            Regex::new(r"(?i)(?:^|\D)(\d{1,2}):(\d{2})\s*([ap])\.?m\b").unwrap(),
            ClockForm::TwelveHourWithMinutes,
        ),
        (
            Regex::new(r"(?i)(?:^|\D)(\d{1,2})\s*([ap])\.?m\b").unwrap(),
            ClockForm::TwelveHour,
        ),
        (
            Regex::new(r"(?:^|\D)(\d{1,2}):(\d{2})(?:\D|$)").unwrap(),
            ClockForm::TwentyFourHour,
        ),
    ];
}

#[derive(Debug, Clone, Copy)]
enum ClockForm {
    TwelveHourWithMinutes,
    TwelveHour,
    TwentyFourHour,
}

impl ClockForm {
    fn resolve(self, captures: &Captures) -> Option<NaiveTime> {
        let hour: u32 = captures[1].parse().ok()?;

        match self {
            ClockForm::TwelveHourWithMinutes => {
                let minute = captures[2].parse().ok()?;
                from_twelve_hour(hour, minute, &captures[3])
            }
            ClockForm::TwelveHour => from_twelve_hour(hour, 0, &captures[2]),
            ClockForm::TwentyFourHour => {
                NaiveTime::from_hms_opt(hour, captures[2].parse().ok()?, 0)
            }
        }
    }
}

fn from_twelve_hour(hour: u32, minute: u32, meridiem: &str) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }

    let is_pm = meridiem.eq_ignore_ascii_case("p");

    NaiveTime::from_hms_opt(hour % 12 + if is_pm { 12 } else { 0 }, minute, 0)
}

/// Extracts a clock time from free text, normalized to 24-hour civil time.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let (form, captures) = TIME_PATTERNS
        .iter()
        .find_map(|(pattern, form)| pattern.captures(text).map(|captures| (*form, captures)))?;

    let time = form.resolve(&captures);

    if time.is_none() {
        trace!("'{}' looks like a {:?} time but is out of range", text, form);
    }

    time
}

//! Calendar helpers for plan weeks.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// The Monday a plan generated on `today` covers.
///
/// Always strictly after `today`: a Monday maps to the following Monday.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let from_monday = u64::from(today.weekday().num_days_from_monday());
    today + Days::new(7 - from_monday)
}

/// Last day of the week starting at `week_start`.
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Days::new(6)
}

/// Offset from Monday for an English day name, ignoring case and
/// surrounding whitespace. Three-letter abbreviations are accepted.
pub fn weekday_offset(day: &str) -> Option<u64> {
    day.trim()
        .parse::<Weekday>()
        .ok()
        .map(|d| u64::from(d.num_days_from_monday()))
}

/// Date for the meal at `position` named `day` in a week.
///
/// Unrecognised day names fall back to the meal's position in the plan.
pub fn date_for_day(week_start: NaiveDate, day: &str, position: usize) -> NaiveDate {
    let offset = weekday_offset(day).unwrap_or(position as u64);
    week_start + Days::new(offset)
}

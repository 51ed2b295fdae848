//! crates/course_calendar_core/src/dates.rs
//!
//! Week arithmetic on local wall-clock time.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

/// Monday 00:00:00.000 of the calendar week containing `date`.
///
/// `None` when that Monday falls outside chrono's representable range.
pub fn week_start(date: NaiveDateTime) -> Option<NaiveDateTime> {
    // Sunday is day 0 and belongs to the week that started six days earlier.
    let day_of_week = i64::from(date.weekday().num_days_from_sunday());
    let offset = if day_of_week == 0 { -6 } else { 1 - day_of_week };
    date.date()
        .checked_add_signed(Duration::days(offset))
        .map(|monday| monday.and_time(NaiveTime::MIN))
}

/// Sunday 23:59:59.999 of the calendar week containing `date`.
///
/// `None` when either end of the week is not representable.
pub fn week_end(date: NaiveDateTime) -> Option<NaiveDateTime> {
    week_start(date)?
        .checked_add_signed(Duration::days(7))?
        .checked_sub_signed(Duration::milliseconds(1))
}

/// Human-readable week label, e.g. `1 January - 7 January`.
///
/// The month is repeated even when both ends fall in the same month.
pub fn format_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{} {} - {} {}",
        start.day(),
        start.format("%B"),
        end.day(),
        end.format("%B")
    )
}

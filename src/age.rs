//! age.rs
//!
//! This module provides a calendar-aware age decomposition:
//!     "X years, Y months, Z days"
//! together with the raw totals in days, hours and minutes.
//!
//! Chrono does not provide a built-in year/month/day diff (unlike Python’s
//! relativedelta), so we implement the calendar-aware borrowing rules manually.
//!
//! This logic correctly handles:
//!   • month underflow (borrowing from years)
//!   • day underflow (borrowing from previous month)
//!   • birth days missing from the previous month (29th, 30th, 31st)
//!   • leap years

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{AgeError, InvalidInput};

/// A date with no time-of-day component.
pub type CalendarDate = NaiveDate;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Elapsed time between a birth date and today.
///
/// `years`/`months`/`days` are the calendar decomposition. The totals are
/// independent conversions of the elapsed span between the two midnights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeResult {
    pub years: i32,
    pub months: u32,
    pub days: u32,
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
}

/// Decomposes the span `birthdate..=today`.
///
/// A birth date after `today` is rejected as invalid input.
pub fn decompose(birthdate: CalendarDate, today: CalendarDate) -> Result<AgeResult, AgeError> {
    if birthdate > today {
        return Err(AgeError::InvalidInput(InvalidInput::FutureBirthdate));
    }

    let (years, months, days) = calendar_diff(birthdate, today);

    // Both dates stand for local midnight, so the span is a whole number of days.
    let elapsed_ms = today.signed_duration_since(birthdate).num_milliseconds();

    Ok(AgeResult {
        years,
        months: months as u32,
        days: days as u32,
        total_days: elapsed_ms / MS_PER_DAY,
        total_hours: elapsed_ms / MS_PER_HOUR,
        total_minutes: elapsed_ms / MS_PER_MINUTE,
    })
}

fn calendar_diff(birthdate: NaiveDate, today: NaiveDate) -> (i32, i32, i32) {
    let mut years = today.year() - birthdate.year();
    let mut months = today.month() as i32 - birthdate.month() as i32;
    let mut days = today.day() as i32 - birthdate.day() as i32;

    // Fix day underflow
    if days < 0 {
        months -= 1;

        // Determine the previous month relative to `today`.
        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        // Add days from the previous month (28–31 depending on month & leap year).
        // A birth day that month does not have counts from its last day.
        let days_in_prev_month = days_in_month(prev_year, prev_month);
        let anchor = birthdate.day().min(days_in_prev_month);
        days = (today.day() + days_in_prev_month - anchor) as i32;
    }

    // Fix month underflow
    if months < 0 {
        years -= 1;
        months += 12;
    }

    (years, months, days)
}

impl fmt::Display for AgeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years as i64),
            self.months,
            plural(self.months as i64),
            self.days,
            plural(self.days as i64)
        )
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

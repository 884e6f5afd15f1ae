// src/calendar.rs
//
// Pure date-grid arithmetic: month layout, leap years, ISO week
// resolution and year-progress statistics. No side effects; callers are
// expected to pass month ∈ [1,12] and week ∈ [1,53], out-of-range input
// yields `None`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::EventUser;

pub const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Monday-first, matching the calendar grid columns.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One month of the calendar grid. `offset` is the number of empty
/// leading cells so day 1 lands in its weekday column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGrid {
    pub name: String,
    pub number: u32,
    pub year: i32,
    pub days: Vec<DayCell>,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCell {
    pub number: u32,
    pub weekday: String,
    pub date: NaiveDate,
    pub events: Vec<EventUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProgress {
    pub total_days: u32,
    /// Count of Saturdays and Sundays in the year. The previous
    /// implementation shipped this figure under a "work days" label;
    /// the computation is kept, the name is not.
    pub weekend_days: u32,
    pub days_passed: u32,
    pub percent_passed: f32,
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub fn days_in_month(month: u32, year: i32) -> u32 {
    if month == 2 && is_leap_year(year) {
        return 29;
    }
    MONTH_DAYS[(month - 1) as usize]
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month - 1) as usize]
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Build the grid for one month, with empty event lists.
pub fn build_month(month: u32, year: i32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let num_days = days_in_month(month, year);

    let days = (0..num_days)
        .map(|i| {
            let date = first + Duration::days(i as i64);
            DayCell {
                number: i + 1,
                weekday: weekday_name(date.weekday()).to_string(),
                date,
                events: Vec::new(),
            }
        })
        .collect();

    Some(MonthGrid {
        name: month_name(month).to_string(),
        number: month,
        year,
        days,
        offset: first.weekday().num_days_from_monday(),
    })
}

/// Monday-based weekday index of January 1st.
pub fn year_offset(year: i32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    Some(first.weekday().num_days_from_monday())
}

/// Trailing empty grid rows per month so a 6-row calendar renders
/// without a ragged last row.
pub fn month_row_gaps(year: i32) -> Option<[i64; 12]> {
    let mut gaps = [0i64; 12];

    for (i, gap) in gaps.iter_mut().enumerate() {
        let month = (i + 1) as u32;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let offset = first.weekday().num_days_from_monday();
        let num_days = days_in_month(month, year);

        let mut cols = ((offset + num_days) / 7) as i64;
        let rem = (offset + num_days) % 7;

        if offset != 0 && i > 0 {
            cols -= 1;
        }
        if rem == 0 {
            cols -= 1;
        }

        *gap = cols;
    }

    Some(gaps)
}

/// Resolve the Monday that starts the given ISO week of the given ISO
/// year. Walks back from January 1st to the preceding Monday, then
/// forward in 7-day steps until the ISO year matches, then until the
/// ISO week matches. Handles ISO years whose week 1 starts in the prior
/// Gregorian year (e.g. 2021-W01 begins on 2021-01-04).
pub fn iso_week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if !(1..=53).contains(&week) {
        return None;
    }

    let mut date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    while date.weekday() != Weekday::Mon {
        date = date.pred_opt()?;
    }

    // 54 weeks is enough to cross any ISO year boundary in either
    // direction; a target past the year's last week never matches.
    for _ in 0..54 {
        let iso = date.iso_week();
        if iso.year() == year && iso.week() == week {
            return Some(date);
        }
        if iso.year() > year {
            return None;
        }
        date = date + Duration::days(7);
    }

    None
}

/// Year statistics relative to `today`.
pub fn year_progress(year: i32, today: NaiveDate) -> YearProgress {
    let total_days = days_in_year(year);

    let weekend_days = (1..=total_days)
        .filter_map(|ordinal| NaiveDate::from_yo_opt(year, ordinal))
        .filter(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32;

    let days_passed = today.ordinal();

    YearProgress {
        total_days,
        weekend_days,
        days_passed,
        percent_passed: days_passed as f32 / total_days as f32 * 100.0,
    }
}

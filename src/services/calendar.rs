use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One month of the date-picker grid, computed server-side so every
/// client renders the same disabled/today/selected flags.
#[derive(Debug, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub month_name: String,
    /// Weekday of the 1st, 0 = Sunday. The grid pads this many blanks.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    /// Navigation targets for the picker's arrows.
    pub prev: MonthRef,
    pub next: MonthRef,
}

#[derive(Debug, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    /// "YYYY-MM-DD"
    pub date: String,
    /// Before today, or before the picker's minimum date. Selecting a
    /// disabled day is a no-op.
    pub disabled: bool,
    pub today: bool,
    pub selected: bool,
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    match (first, first_of_next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        _ => 0,
    }
}

/// Month navigation with year rollover.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Build the grid for one month. `today` doubles as the implicit lower
/// bound for departure pickers; `min_date` tightens it for return
/// pickers (no returning before you leave).
pub fn build_month(
    year: i32,
    month: u32,
    today: NaiveDate,
    min_date: Option<NaiveDate>,
    selected: Option<NaiveDate>,
) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let floor = match min_date {
        Some(min) if min > today => min,
        _ => today,
    };

    let days = (1..=days_in_month(year, month))
        .filter_map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(CalendarDay {
                day,
                date: date.format("%Y-%m-%d").to_string(),
                disabled: date < floor,
                today: date == today,
                selected: selected == Some(date),
            })
        })
        .collect();

    let (prev_year, prev_mon) = prev_month(year, month);
    let (next_year, next_mon) = next_month(year, month);

    Some(CalendarMonth {
        year,
        month,
        month_name: MONTH_NAMES[(month - 1) as usize].to_string(),
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
        prev: MonthRef {
            year: prev_year,
            month: prev_mon,
        },
        next: MonthRef {
            year: next_year,
            month: next_mon,
        },
    })
}

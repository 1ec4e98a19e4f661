use chrono::{Datelike, NaiveDate};

/// The single calendar year every tracker instance records against.
pub const TRACKED_YEAR: i32 = 2026;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAY_INITIALS: [char; 7] = ['S', 'M', 'T', 'W', 'T', 'F', 'S'];

/// Number of days in a zero-based `month` of `year`, or 0 when the month is out of range.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month > 11 {
        return 0;
    }
    let Some(first) = NaiveDate::from_ymd_opt(year, month + 1, 1) else {
        return 0;
    };
    let next = if month == 11 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 2, 1)
    };

    next.map(|next| (next - first).num_days() as u32).unwrap_or(0)
}

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month as usize).copied()
}

/// Sunday-first single letter label for a day, e.g. `M` for a Monday.
pub fn weekday_initial(year: i32, month: u32, day: u32) -> Option<char> {
    let date = NaiveDate::from_ymd_opt(year, month.checked_add(1)?, day)?;
    Some(WEEKDAY_INITIALS[date.weekday().num_days_from_sunday() as usize])
}

pub fn is_valid_day(year: i32, month: u32, day: u32) -> bool {
    (1..=days_in_month(year, month)).contains(&day)
}

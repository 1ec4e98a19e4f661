use crate::calendar::{TRACKED_YEAR, days_in_month, month_name, weekday_initial};
use crate::habits::HabitRecord;
use crate::models::{BadgeView, BoardResponse, DayHeader, HabitRow};
use chrono::{Datelike, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Week,
    TwoWeeks,
    ThreeWeeks,
    Month,
}

impl Badge {
    pub const ALL: [Badge; 4] = [Badge::Week, Badge::TwoWeeks, Badge::ThreeWeeks, Badge::Month];

    pub fn threshold(self) -> u32 {
        match self {
            Badge::Week => 7,
            Badge::TwoWeeks => 14,
            Badge::ThreeWeeks => 21,
            Badge::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::Week => "Week",
            Badge::TwoWeeks => "2 Weeks",
            Badge::ThreeWeeks => "3 Weeks",
            Badge::Month => "Month",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Badge::Week => "🔥",
            Badge::TwoWeeks => "⭐",
            Badge::ThreeWeeks => "💎",
            Badge::Month => "👑",
        }
    }
}

/// Checked days of `habit` within the month, ignoring entries past its last day.
pub fn month_total(record: &HabitRecord, habit: &str, month: u32) -> u32 {
    (1..=days_in_month(TRACKED_YEAR, month))
        .filter(|day| record.is_checked(habit, month, *day))
        .count() as u32
}

/// Streak in `month` ending at today's day-of-month.
///
/// The anchor is the wall-clock day number whichever month is displayed, so a past
/// month is truncated at the same day number as the current one.
pub fn streak(record: &HabitRecord, habit: &str, month: u32) -> u32 {
    streak_at(record, habit, month, Local::now().day())
}

pub fn streak_at(record: &HabitRecord, habit: &str, month: u32, today_day: u32) -> u32 {
    let anchor = days_in_month(TRACKED_YEAR, month).min(today_day);
    (1..=anchor)
        .rev()
        .take_while(|day| record.is_checked(habit, month, *day))
        .count() as u32
}

/// Every badge whose threshold the total reaches, lowest first.
pub fn badges_for_total(total: u32) -> Vec<Badge> {
    Badge::ALL
        .into_iter()
        .filter(|badge| total >= badge.threshold())
        .collect()
}

pub fn badges(record: &HabitRecord, habit: &str, month: u32) -> Vec<Badge> {
    badges_for_total(month_total(record, habit, month))
}

/// Message for a month total just reached by checking a day.
pub fn celebration_for(new_total: u32) -> Option<String> {
    match new_total {
        7 => Some("🎉 Week streak! You're on fire!".to_string()),
        30 => Some("🏆 30 days! Legendary commitment!".to_string()),
        n if n > 0 && n % 10 == 0 => Some(format!("✨ {n} days! Amazing progress!")),
        _ => None,
    }
}

pub fn completion_percentage(total: u32, days: u32) -> u32 {
    if days == 0 {
        return 0;
    }
    (f64::from(total) * 100.0 / f64::from(days)).round() as u32
}

pub fn build_board(record: &HabitRecord, month: u32, celebration: Option<String>) -> BoardResponse {
    build_board_at(record, month, Local::now().day(), celebration)
}

pub fn build_board_at(
    record: &HabitRecord,
    month: u32,
    today_day: u32,
    celebration: Option<String>,
) -> BoardResponse {
    let days_in_month = days_in_month(TRACKED_YEAR, month);

    let days = (1..=days_in_month)
        .filter_map(|day| {
            weekday_initial(TRACKED_YEAR, month, day).map(|weekday| DayHeader { day, weekday })
        })
        .collect();

    let habits = record
        .habits
        .iter()
        .map(|habit| {
            let total = month_total(record, habit, month);
            HabitRow {
                name: habit.clone(),
                checked_days: (1..=days_in_month)
                    .filter(|day| record.is_checked(habit, month, *day))
                    .collect(),
                streak: streak_at(record, habit, month, today_day),
                total,
                percentage: completion_percentage(total, days_in_month),
                badges: badges_for_total(total)
                    .into_iter()
                    .map(|badge| BadgeView {
                        label: badge.label().to_string(),
                        emoji: badge.emoji().to_string(),
                    })
                    .collect(),
            }
        })
        .collect();

    BoardResponse {
        year: TRACKED_YEAR,
        month,
        month_name: month_name(month).unwrap_or_default().to_string(),
        days_in_month,
        days,
        habits,
        celebration,
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddHabitRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub habit: String,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStep {
    Prev,
    Next,
}

#[derive(Debug, Deserialize)]
pub struct MonthRequest {
    pub month: Option<u32>,
    pub step: Option<MonthStep>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHeader {
    pub day: u32,
    pub weekday: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeView {
    pub label: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRow {
    pub name: String,
    pub checked_days: Vec<u32>,
    pub streak: u32,
    pub total: u32,
    pub percentage: u32,
    pub badges: Vec<BadgeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub days_in_month: u32,
    pub days: Vec<DayHeader>,
    pub habits: Vec<HabitRow>,
    pub celebration: Option<String>,
}

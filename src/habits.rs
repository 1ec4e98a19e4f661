use crate::credentials::AccountId;
use crate::storage::{Storage, StorageKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_HABITS: [&str; 2] = ["Reading", "Coding"];

/// One completed day of one habit. `month` is zero-based, `day` one-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey {
    pub habit: String,
    pub month: u32,
    pub day: u32,
}

impl DayKey {
    pub fn new(habit: impl Into<String>, month: u32, day: u32) -> Self {
        Self {
            habit: habit.into(),
            month,
            day,
        }
    }
}

/// Habit names in display order plus the set of days marked done.
///
/// Days are stored sparsely: a key is present only while checked. Deleting a habit
/// leaves its days in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    #[serde(rename = "habitList")]
    pub habits: Vec<String>,
    pub checked_days: BTreeSet<DayKey>,
}

impl Default for HabitRecord {
    fn default() -> Self {
        Self {
            habits: DEFAULT_HABITS.iter().map(|name| name.to_string()).collect(),
            checked_days: BTreeSet::new(),
        }
    }
}

impl HabitRecord {
    pub fn contains(&self, habit: &str) -> bool {
        self.habits.iter().any(|existing| existing == habit)
    }

    /// Appends a trimmed name. Returns false when it was blank or already listed.
    pub fn add_habit(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.habits.push(name.to_string());
        true
    }

    pub fn delete_habit(&mut self, name: &str) -> bool {
        let before = self.habits.len();
        self.habits.retain(|existing| existing != name);
        self.habits.len() != before
    }

    /// Flips a day and returns its new state.
    pub fn toggle_day(&mut self, habit: &str, month: u32, day: u32) -> bool {
        let key = DayKey::new(habit, month, day);
        if self.checked_days.remove(&key) {
            false
        } else {
            self.checked_days.insert(key);
            true
        }
    }

    pub fn is_checked(&self, habit: &str, month: u32, day: u32) -> bool {
        self.checked_days.contains(&DayKey::new(habit, month, day))
    }
}

#[derive(Debug, Clone)]
pub struct HabitStore {
    storage: Storage,
}

impl HabitStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Falls back to the default seed, without writing it, when nothing was saved yet.
    pub async fn load(&self, account_id: &AccountId) -> HabitRecord {
        self.storage
            .read(&StorageKey::HabitData(account_id.clone()))
            .await
            .unwrap_or_default()
    }

    pub async fn save(&self, account_id: &AccountId, record: &HabitRecord) {
        self.storage
            .persist(&StorageKey::HabitData(account_id.clone()), record)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::unique_storage;

    #[test]
    fn default_seed_has_two_habits_and_no_days() {
        let record = HabitRecord::default();
        assert_eq!(record.habits, vec!["Reading", "Coding"]);
        assert!(record.checked_days.is_empty());
    }

    #[test]
    fn add_habit_ignores_blank_and_duplicate_names() {
        let mut record = HabitRecord::default();
        assert!(!record.add_habit("   "));
        assert!(!record.add_habit("Reading"));
        assert!(!record.add_habit(" Reading "));
        assert!(record.add_habit(" Running "));
        assert!(record.add_habit("reading"));
        assert_eq!(record.habits, vec!["Reading", "Coding", "Running", "reading"]);
    }

    #[test]
    fn toggle_day_flips_and_keeps_storage_sparse() {
        let mut record = HabitRecord::default();
        assert!(record.toggle_day("Reading", 2, 14));
        assert!(record.is_checked("Reading", 2, 14));
        assert!(!record.toggle_day("Reading", 2, 14));
        assert!(!record.is_checked("Reading", 2, 14));
        assert!(record.checked_days.is_empty());
    }

    #[test]
    fn delete_keeps_history_dormant() {
        let mut record = HabitRecord::default();
        record.toggle_day("Coding", 0, 3);
        assert!(record.delete_habit("Coding"));
        assert!(!record.delete_habit("Coding"));
        assert_eq!(record.habits, vec!["Reading"]);
        assert!(record.checked_days.contains(&DayKey::new("Coding", 0, 3)));

        assert!(record.add_habit("Coding"));
        assert_eq!(record.habits, vec!["Reading", "Coding"]);
        assert_eq!(record.checked_days.len(), 1);
    }

    #[tokio::test]
    async fn load_without_saved_data_returns_seed_without_writing() {
        let storage = unique_storage("habits_seed");
        let store = HabitStore::new(storage.clone());
        let account = AccountId::normalize("jo");

        assert_eq!(store.load(&account).await, HabitRecord::default());
        assert!(!storage.path_for(&StorageKey::HabitData(account)).exists());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = HabitStore::new(unique_storage("habits_round_trip"));
        let account = AccountId::normalize("kim");
        let mut record = HabitRecord::default();
        record.add_habit("Stretching");
        record.delete_habit("Reading");
        record.toggle_day("Stretching", 11, 31);
        record.toggle_day("Reading", 4, 1);

        store.save(&account, &record).await;
        assert_eq!(store.load(&account).await, record);
        assert_eq!(
            store.load(&AccountId::normalize("someone-else")).await,
            HabitRecord::default()
        );
    }

    #[tokio::test]
    async fn saved_file_uses_habit_list_and_checked_days_fields() {
        let storage = unique_storage("habits_shape");
        let store = HabitStore::new(storage.clone());
        let account = AccountId::normalize("lu");
        let mut record = HabitRecord::default();
        record.toggle_day("Reading", 0, 2);
        store.save(&account, &record).await;

        let raw: serde_json::Value = storage.read(&StorageKey::HabitData(account)).await.unwrap();
        assert_eq!(raw["habitList"], serde_json::json!(["Reading", "Coding"]));
        assert_eq!(
            raw["checkedDays"],
            serde_json::json!([{ "habit": "Reading", "month": 0, "day": 2 }])
        );
        assert!(raw.get("habits").is_none());
    }
}

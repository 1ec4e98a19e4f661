use crate::calendar::{TRACKED_YEAR, is_valid_day};
use crate::celebration::{Banner, Celebration};
use crate::credentials::{AccountId, CredentialStore};
use crate::errors::AuthError;
use crate::habits::{HabitRecord, HabitStore};
use crate::models::{BoardResponse, MonthStep, SessionResponse};
use crate::session::{SessionContext, SessionManager};
use crate::stats::{build_board, celebration_for, month_total};
use crate::storage::Storage;
use std::time::Duration;
use tracing::debug;

const LAST_MONTH: u32 = 11;

/// Everything one running instance holds: the session, the logged-in account's
/// habits, the month on display and the celebration banner.
pub struct Tracker {
    sessions: SessionManager,
    habits: HabitStore,
    record: HabitRecord,
    month: u32,
    banner: Banner,
}

impl Tracker {
    pub async fn open(storage: Storage, celebration_duration: Duration) -> Self {
        let credentials = CredentialStore::open(storage.clone()).await;
        Self {
            sessions: SessionManager::new(storage.clone(), credentials),
            habits: HabitStore::new(storage),
            record: HabitRecord::default(),
            month: 0,
            banner: Banner::new(celebration_duration),
        }
    }

    pub fn session(&self) -> &SessionContext {
        self.sessions.context()
    }

    pub fn record(&self) -> &HabitRecord {
        &self.record
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn celebration(&self) -> Option<Celebration> {
        self.banner.current()
    }

    pub async fn signup(&mut self, username: &str, password: &str) -> Result<AccountId, AuthError> {
        let account_id = self.sessions.signup(username, password).await?;
        self.enter(&account_id).await;
        Ok(account_id)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<AccountId, AuthError> {
        let account_id = self.sessions.login(username, password).await?;
        self.enter(&account_id).await;
        Ok(account_id)
    }

    /// Saved habit data stays on disk; only the in-memory copy goes back to the seed.
    pub async fn logout(&mut self) {
        self.sessions.logout().await;
        self.record = HabitRecord::default();
        self.banner.clear();
    }

    pub async fn restore_session(&mut self) -> Option<AccountId> {
        let account_id = self.sessions.restore().await?;
        self.enter(&account_id).await;
        Some(account_id)
    }

    pub async fn add_habit(&mut self, name: &str) -> bool {
        let added = self.record.add_habit(name);
        if added {
            self.save().await;
        }
        added
    }

    pub async fn delete_habit(&mut self, name: &str) -> bool {
        let deleted = self.record.delete_habit(name);
        if deleted {
            self.save().await;
        }
        deleted
    }

    /// Toggles `day` of the displayed month. Checking a day may raise a celebration;
    /// unchecking never does. Returns the day's new state.
    pub async fn toggle_day(&mut self, habit: &str, day: u32) -> bool {
        let month = self.month;
        let checked = self.record.toggle_day(habit, month, day);
        if checked {
            let total = month_total(&self.record, habit, month);
            if let Some(message) = celebration_for(total) {
                debug!(habit, total, "celebrating");
                self.banner.show(Celebration {
                    habit: habit.to_string(),
                    total,
                    message,
                });
            }
        }
        self.save().await;
        checked
    }

    pub fn is_valid_day(&self, day: u32) -> bool {
        is_valid_day(TRACKED_YEAR, self.month, day)
    }

    /// Returns false, leaving the month unchanged, for indices past December.
    pub fn set_month(&mut self, month: u32) -> bool {
        if month > LAST_MONTH {
            return false;
        }
        self.month = month;
        true
    }

    pub fn step_month(&mut self, step: MonthStep) {
        self.month = match step {
            MonthStep::Prev => self.month.saturating_sub(1),
            MonthStep::Next => (self.month + 1).min(LAST_MONTH),
        };
    }

    pub fn board(&self) -> BoardResponse {
        build_board(&self.record, self.month, self.celebration_message())
    }

    #[cfg(test)]
    fn board_at(&self, today_day: u32) -> BoardResponse {
        let celebration = self.celebration_message();
        crate::stats::build_board_at(&self.record, self.month, today_day, celebration)
    }

    pub fn session_view(&self) -> SessionResponse {
        let account = self.sessions.current_account();
        SessionResponse {
            logged_in: self.session().is_logged_in(),
            account_id: self.session().account_id().map(|id| id.to_string()),
            display_name: account.map(|account| account.display_name),
        }
    }

    async fn enter(&mut self, account_id: &AccountId) {
        self.record = self.habits.load(account_id).await;
        self.banner.clear();
    }

    fn celebration_message(&self) -> Option<String> {
        self.banner.current().map(|celebration| celebration.message)
    }

    async fn save(&self) {
        if let Some(account_id) = self.sessions.context().account_id() {
            self.habits.save(account_id, &self.record).await;
        }
    }
}

//! Interface to the managed backend that owns every durable record.
//!
//! The web layer only ever talks to [`Backend`] and [`HabitStore`]; the HTTP
//! implementation lives in [`crate::rest`].

use crate::models::{
    ArchiveUpdate, AuthResponse, Habit, HabitStats, NewHabit, Session, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend rejected the credentials")]
    Unauthorized,
}

impl BackendError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
            || matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// Auth surface plus a factory for per-session data access.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, BackendError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Resolves the user behind an access token; `None` when the token is no longer valid.
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    async fn exchange_code_for_session(&self, code: &str) -> Result<Session, BackendError>;

    fn store(&self, access_token: &str) -> Arc<dyn HabitStore>;
}

/// Table and procedure access on behalf of one signed-in user.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Habits with the given archival flag, newest first.
    async fn list_habits(&self, archived: bool) -> Result<Vec<Habit>, BackendError>;

    async fn insert_habit(&self, habit: &NewHabit) -> Result<(), BackendError>;

    async fn update_archival(&self, habit_id: &str, update: &ArchiveUpdate) -> Result<(), BackendError>;

    async fn delete_habit(&self, habit_id: &str) -> Result<(), BackendError>;

    /// Completion dates on or after `cutoff`, ascending.
    async fn completion_dates_since(
        &self,
        habit_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Vec<NaiveDate>, BackendError>;

    async fn habits_completed_on(&self, date: NaiveDate) -> Result<Vec<String>, BackendError>;

    async fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), BackendError>;

    async fn current_streak(&self, habit_id: &str) -> Result<u32, BackendError>;

    async fn habit_stats(&self, habit_id: &str) -> Result<HabitStats, BackendError>;

    async fn complete_habit(&self, habit_id: &str) -> Result<(), BackendError>;

    async fn evolve_habit(&self, habit_id: &str, new_description: &str) -> Result<(), BackendError>;
}

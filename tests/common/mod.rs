#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use minimal_habits::models::{
    ArchiveUpdate, AuthResponse, Habit, HabitStats, NewHabit, Session, User,
};
use minimal_habits::{Backend, BackendError, HabitStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

pub const PASSWORD: &str = "secret1";

#[derive(Default)]
pub struct FakeState {
    pub habits: Vec<Habit>,
    pub completions: Vec<(String, NaiveDate)>,
    pub streaks: HashMap<String, u32>,
    pub evolutions: Vec<(String, String)>,
    pub tokens: HashMap<String, User>,
    pub accounts: HashMap<String, String>,
    pub failing: HashSet<&'static str>,
    pub calls: Vec<String>,
    gate: Option<Arc<Notify>>,
    next_id: u32,
}

/// In-memory stand-in for the managed backend.
///
/// Streaks are whatever the test seeds, bumped by one on every completion.
#[derive(Clone)]
pub struct FakeBackend {
    pub today: NaiveDate,
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_user(self, token: &str, user_id: &str, email: &str) -> Self {
        {
            let mut state = self.state();
            state.tokens.insert(
                token.to_string(),
                User {
                    id: user_id.to_string(),
                    email: Some(email.to_string()),
                },
            );
            state.accounts.insert(email.to_string(), token.to_string());
        }
        self
    }

    pub fn add_habit(&self, id: &str, name: &str, tags: &[&str], archived: bool) {
        let mut state = self.state();
        let created_at = Utc::now() + chrono::Duration::seconds(state.habits.len() as i64);
        state.habits.push(Habit {
            id: id.to_string(),
            user_id: Some("u1".to_string()),
            name: name.to_string(),
            description: Some(format!("{name} a little")),
            tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
            frequency_type: Some("daily".to_string()),
            is_archived: archived,
            archived_at: archived.then(Utc::now),
            created_at,
        });
    }

    pub fn add_completion(&self, habit_id: &str, date: NaiveDate) {
        self.state().completions.push((habit_id.to_string(), date));
    }

    pub fn set_streak(&self, habit_id: &str, streak: u32) {
        self.state().streaks.insert(habit_id.to_string(), streak);
    }

    pub fn fail(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    /// Makes `complete_habit` wait, after recording the call, until the gate is notified.
    pub fn gate_completions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().gate = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<MutexGuard<'_, FakeState>, BackendError> {
        let mut state = self.state();
        state.calls.push(format!("{operation} {detail}").trim_end().to_string());
        if state.failing.contains(operation) {
            return Err(BackendError::Status {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthResponse, BackendError> {
        let mut state = self.record("sign_up", email.to_string())?;
        let token = format!("token-{email}");
        let user = User {
            id: format!("user-{email}"),
            email: Some(email.to_string()),
        };
        state.tokens.insert(token.clone(), user.clone());
        state.accounts.insert(email.to_string(), token.clone());
        Ok(AuthResponse {
            user: Some(user.clone()),
            session: Some(Session {
                access_token: token,
                refresh_token: None,
                expires_in: Some(3600),
                user: Some(user),
            }),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let state = self.record("sign_in", email.to_string())?;
        match state.accounts.get(email) {
            Some(token) if password == PASSWORD => Ok(Session {
                access_token: token.clone(),
                refresh_token: None,
                expires_in: Some(3600),
                user: state.tokens.get(token).cloned(),
            }),
            _ => Err(BackendError::Status {
                status: 400,
                message: "Invalid login credentials".into(),
            }),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        Ok(self.state().tokens.get(access_token).cloned())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.record("sign_out", access_token.to_string())?;
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str) -> Result<Session, BackendError> {
        let state = self.record("exchange_code", code.to_string())?;
        let token = format!("token-{code}");
        match state.tokens.get(&token) {
            Some(user) => Ok(Session {
                access_token: token.clone(),
                refresh_token: None,
                expires_in: None,
                user: Some(user.clone()),
            }),
            None => Err(BackendError::Status {
                status: 400,
                message: "invalid flow state".into(),
            }),
        }
    }

    fn store(&self, _access_token: &str) -> Arc<dyn HabitStore> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl HabitStore for FakeBackend {
    async fn list_habits(&self, archived: bool) -> Result<Vec<Habit>, BackendError> {
        let state = self.record("list_habits", archived.to_string())?;
        let mut habits: Vec<Habit> = state
            .habits
            .iter()
            .filter(|habit| habit.is_archived == archived)
            .cloned()
            .collect();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(habits)
    }

    async fn insert_habit(&self, habit: &NewHabit) -> Result<(), BackendError> {
        let mut state = self.record("insert_habit", habit.name.clone())?;
        state.next_id += 1;
        let id = format!("new-{}", state.next_id);
        let created_at = Utc::now() + chrono::Duration::days(1);
        state.habits.push(Habit {
            id,
            user_id: Some(habit.user_id.clone()),
            name: habit.name.clone(),
            description: habit.description.clone(),
            tags: habit.tags.clone(),
            frequency_type: Some(habit.frequency_type.clone()),
            is_archived: habit.is_archived,
            archived_at: None,
            created_at,
        });
        Ok(())
    }

    async fn update_archival(&self, habit_id: &str, update: &ArchiveUpdate) -> Result<(), BackendError> {
        let mut state = self.record("update_archival", format!("{habit_id} {}", update.is_archived))?;
        if let Some(habit) = state.habits.iter_mut().find(|habit| habit.id == habit_id) {
            habit.is_archived = update.is_archived;
            habit.archived_at = update.archived_at;
        }
        Ok(())
    }

    async fn delete_habit(&self, habit_id: &str) -> Result<(), BackendError> {
        let mut state = self.record("delete_habit", habit_id.to_string())?;
        state.habits.retain(|habit| habit.id != habit_id);
        state.completions.retain(|(id, _)| id != habit_id);
        Ok(())
    }

    async fn completion_dates_since(
        &self,
        habit_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        let state = self.record("completion_dates_since", format!("{habit_id} {cutoff}"))?;
        let mut dates: Vec<NaiveDate> = state
            .completions
            .iter()
            .filter(|(id, date)| id == habit_id && *date >= cutoff)
            .map(|(_, date)| *date)
            .collect();
        dates.sort();
        Ok(dates)
    }

    async fn habits_completed_on(&self, date: NaiveDate) -> Result<Vec<String>, BackendError> {
        let state = self.record("habits_completed_on", date.to_string())?;
        Ok(state
            .completions
            .iter()
            .filter(|(_, day)| *day == date)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), BackendError> {
        let mut state = self.record("delete_completion", format!("{habit_id} {date}"))?;
        state.completions.retain(|(id, day)| !(id == habit_id && *day == date));
        if let Some(streak) = state.streaks.get_mut(habit_id) {
            *streak = streak.saturating_sub(1);
        }
        Ok(())
    }

    async fn current_streak(&self, habit_id: &str) -> Result<u32, BackendError> {
        let state = self.record("current_streak", habit_id.to_string())?;
        Ok(state.streaks.get(habit_id).copied().unwrap_or(0))
    }

    async fn habit_stats(&self, habit_id: &str) -> Result<HabitStats, BackendError> {
        let state = self.record("habit_stats", habit_id.to_string())?;
        let current = state.streaks.get(habit_id).copied().unwrap_or(0);
        let total = state.completions.iter().filter(|(id, _)| id == habit_id).count() as u32;
        Ok(HabitStats {
            current_streak: current,
            longest_streak: current.max(total),
            total_completions: total,
            days_failed: 0,
            success_rate: 100.0,
            days_since_creation: total,
        })
    }

    async fn complete_habit(&self, habit_id: &str) -> Result<(), BackendError> {
        let gate = {
            let mut state = self.record("complete_habit", habit_id.to_string())?;
            let today = self.today;
            state.completions.push((habit_id.to_string(), today));
            *state.streaks.entry(habit_id.to_string()).or_insert(0) += 1;
            state.gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }

    async fn evolve_habit(&self, habit_id: &str, new_description: &str) -> Result<(), BackendError> {
        let mut state = self.record("evolve_habit", format!("{habit_id} {new_description}"))?;
        state
            .evolutions
            .push((habit_id.to_string(), new_description.to_string()));
        if let Some(habit) = state.habits.iter_mut().find(|habit| habit.id == habit_id) {
            habit.description = Some(new_description.to_string());
        }
        Ok(())
    }
}

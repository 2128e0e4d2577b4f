use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_HABIT_NAME_LEN: usize = 255;
pub const DAILY_FREQUENCY: &str = "daily";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub frequency_type: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|candidate| candidate == tag)
    }
}

/// A habit with the streak the backend reported for it during the current fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitWithStreak {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewHabit {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency_type: String,
    pub tags: Option<Vec<String>>,
    pub is_archived: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveUpdate {
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionDate {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionHabitId {
    pub habit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub total_completions: u32,
    #[serde(default)]
    pub days_failed: u32,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub days_since_creation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub completed: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub completed_count: usize,
    pub rate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitRow {
    #[serde(flatten)]
    pub habit: HabitWithStreak,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub today: NaiveDate,
    pub archived: bool,
    pub query: String,
    pub selected_tag: Option<String>,
    pub tags: Vec<String>,
    pub habits: Vec<HabitRow>,
    pub summary: SummaryStats,
}

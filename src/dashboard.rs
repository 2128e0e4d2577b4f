//! Per-view controller for the habit dashboard.
//!
//! A [`Dashboard`] is built for one request: loading fetches the habit
//! partition selected by the archival switch, asks the backend for each
//! streak, and reconciles the completion tracker. Mutating actions re-fetch a
//! loaded dashboard so the backend stays the only source of truth. An unloaded
//! one skips the re-fetch and is loaded only when something has to be shown.

use crate::backend::{BackendError, HabitStore};
use crate::heatmap::{build_heatmap, heatmap_cutoff};
use crate::models::{
    ArchiveUpdate, CalendarCell, DashboardView, HabitRow, HabitStats, HabitWithStreak, NewHabit,
    DAILY_FREQUENCY,
};
use crate::tracker::{CompletionTracker, TrackerError};
use crate::validation::{validate_evolution, HabitDraft, ValidationError};
use crate::views::{aggregate_tags, filter_habits, summarize};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("habit {0} is not in the current view")]
    UnknownHabit(String),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct Dashboard {
    store: Arc<dyn HabitStore>,
    tracker: CompletionTracker,
    archived: bool,
    loaded: bool,
    habits: Vec<HabitWithStreak>,
}

impl Dashboard {
    /// A dashboard that has not fetched anything yet.
    pub fn new(store: Arc<dyn HabitStore>, tracker: CompletionTracker, archived: bool) -> Self {
        Self {
            store,
            tracker,
            archived,
            loaded: false,
            habits: Vec::new(),
        }
    }

    pub async fn load(
        store: Arc<dyn HabitStore>,
        today: NaiveDate,
        archived: bool,
    ) -> Result<Self, BackendError> {
        let mut dashboard = Self::new(store, CompletionTracker::new(today), archived);
        dashboard.refresh().await?;
        Ok(dashboard)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn ensure_loaded(&mut self) -> Result<(), BackendError> {
        if !self.loaded {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Re-fetches after a mutation, unless nothing has been shown yet.
    async fn sync(&mut self) -> Result<(), BackendError> {
        if self.loaded {
            self.refresh().await?;
        }
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.tracker.today()
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    pub fn habits(&self) -> &[HabitWithStreak] {
        &self.habits
    }

    pub fn habit(&self, habit_id: &str) -> Option<&HabitWithStreak> {
        self.habits.iter().find(|item| item.habit.id == habit_id)
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    /// Re-queries the selected partition, its streaks, and today's completions.
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        let habits = self.store.list_habits(self.archived).await?;
        let completed = self.store.habits_completed_on(self.today()).await?;
        self.habits = habits
            .into_iter()
            .map(|habit| HabitWithStreak {
                habit,
                current_streak: 0,
            })
            .collect();
        self.tracker.reconcile(completed);
        self.loaded = true;
        self.refresh_streaks().await;
        Ok(())
    }

    /// Fetches every streak concurrently. A failed lookup is logged and shows as zero.
    pub async fn refresh_streaks(&mut self) {
        let mut lookups = JoinSet::new();
        for (index, item) in self.habits.iter().enumerate() {
            let store = Arc::clone(&self.store);
            let habit_id = item.habit.id.clone();
            lookups.spawn(async move {
                let streak = store.current_streak(&habit_id).await;
                (index, habit_id, streak)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            let (index, habit_id, streak) = match joined {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "streak lookup task failed");
                    continue;
                }
            };
            let streak = streak.unwrap_or_else(|err| {
                warn!(habit_id = %habit_id, error = %err, "failed to fetch streak");
                0
            });
            if let Some(item) = self.habits.get_mut(index) {
                item.current_streak = streak;
            }
        }
    }

    pub async fn set_archived_view(&mut self, archived: bool) -> Result<(), BackendError> {
        self.archived = archived;
        self.refresh().await
    }

    pub fn view(&self, query: &str, selected_tag: Option<&str>) -> DashboardView {
        let selected_tag = selected_tag.filter(|tag| !tag.is_empty());
        let filtered = filter_habits(&self.habits, query, selected_tag);
        let completed = self.tracker.completed();
        let summary = summarize(&filtered, &completed);

        DashboardView {
            today: self.today(),
            archived: self.archived,
            query: query.trim().to_string(),
            selected_tag: selected_tag.map(str::to_string),
            tags: aggregate_tags(&self.habits),
            habits: filtered
                .into_iter()
                .map(|item| HabitRow {
                    completed_today: completed.contains(&item.habit.id),
                    habit: item.clone(),
                })
                .collect(),
            summary,
        }
    }

    pub async fn complete(&mut self, habit_id: &str) -> Result<(), ActionError> {
        self.tracker.complete(self.store.as_ref(), habit_id).await?;
        self.refresh_streaks().await;
        Ok(())
    }

    pub async fn uncomplete(&mut self, habit_id: &str) -> Result<(), ActionError> {
        self.tracker.uncomplete(self.store.as_ref(), habit_id).await?;
        self.refresh_streaks().await;
        Ok(())
    }

    /// Needs today's completions to know which way to flip, so it loads first.
    pub async fn toggle(&mut self, habit_id: &str) -> Result<bool, ActionError> {
        self.ensure_loaded().await?;
        let completed = self.tracker.toggle(self.store.as_ref(), habit_id).await?;
        self.refresh_streaks().await;
        Ok(completed)
    }

    pub async fn create(&mut self, user_id: &str, draft: HabitDraft) -> Result<(), ActionError> {
        let habit = NewHabit {
            user_id: user_id.to_string(),
            name: draft.name,
            description: draft.description,
            frequency_type: DAILY_FREQUENCY.to_string(),
            tags: draft.tags,
            is_archived: false,
        };
        if let Err(err) = self.store.insert_habit(&habit).await {
            error!(name = %habit.name, error = %err, "failed to create habit");
            return Err(err.into());
        }
        info!(name = %habit.name, "habit created");
        self.sync().await?;
        Ok(())
    }

    pub async fn archive(&mut self, habit_id: &str) -> Result<(), ActionError> {
        self.set_archival(habit_id, true).await
    }

    pub async fn unarchive(&mut self, habit_id: &str) -> Result<(), ActionError> {
        self.set_archival(habit_id, false).await
    }

    async fn set_archival(&mut self, habit_id: &str, archived: bool) -> Result<(), ActionError> {
        let update = ArchiveUpdate {
            is_archived: archived,
            archived_at: archived.then(Utc::now),
        };
        if let Err(err) = self.store.update_archival(habit_id, &update).await {
            error!(habit_id, archived, error = %err, "failed to update archival state");
            return Err(err.into());
        }
        info!(habit_id, archived, "habit archival state changed");
        self.sync().await?;
        Ok(())
    }

    pub async fn delete(&mut self, habit_id: &str) -> Result<(), ActionError> {
        if let Err(err) = self.store.delete_habit(habit_id).await {
            error!(habit_id, error = %err, "failed to delete habit");
            return Err(err.into());
        }
        info!(habit_id, "habit deleted");
        self.sync().await?;
        Ok(())
    }

    /// Validates against the current description, so it loads first.
    pub async fn evolve(&mut self, habit_id: &str, proposed: &str) -> Result<(), ActionError> {
        self.ensure_loaded().await?;
        let current = self
            .habit(habit_id)
            .ok_or_else(|| ActionError::UnknownHabit(habit_id.to_string()))?;
        let description = validate_evolution(current.habit.description.as_deref(), proposed)?;

        if let Err(err) = self.store.evolve_habit(habit_id, &description).await {
            error!(habit_id, error = %err, "failed to evolve habit");
            return Err(err.into());
        }
        info!(habit_id, "habit evolved");
        self.sync().await?;
        Ok(())
    }

    pub async fn calendar(&self, habit_id: &str) -> Result<Vec<CalendarCell>, BackendError> {
        let today = self.today();
        let dates = self
            .store
            .completion_dates_since(habit_id, heatmap_cutoff(today))
            .await
            .inspect_err(|err| error!(habit_id, error = %err, "failed to fetch completion history"))?;
        Ok(build_heatmap(today, &dates))
    }

    pub async fn stats(&self, habit_id: &str) -> Result<HabitStats, BackendError> {
        self.store
            .habit_stats(habit_id)
            .await
            .inspect_err(|err| error!(habit_id, error = %err, "failed to fetch habit stats"))
    }
}

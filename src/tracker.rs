//! Which habits count as done today, as far as this view knows.
//!
//! The set is a hint: it changes only after the backend confirms a toggle and
//! is replaced wholesale by [`CompletionTracker::reconcile`] on every fetch.
//! In-flight changes live in a [`PendingSet`] shared by every request, so two
//! requests for the same habit cannot both reach the backend.

use crate::backend::{BackendError, HabitStore};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("a completion change for habit {0} is already in progress")]
    InFlight(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Completion changes in progress, keyed by `(scope, habit id)`.
///
/// The scope is the signed-in user, so accounts never block each other.
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    inner: Arc<Mutex<HashSet<(String, String)>>>,
}

impl PendingSet {
    fn lock(&self) -> MutexGuard<'_, HashSet<(String, String)>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, scope: &str, habit_id: &str) -> bool {
        self.lock()
            .contains(&(scope.to_string(), habit_id.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[derive(Debug)]
pub struct CompletionTracker {
    today: NaiveDate,
    scope: String,
    pending: PendingSet,
    completed: Mutex<HashSet<String>>,
}

/// Releases the in-flight mark for a habit when the request settles or is dropped.
struct Pending<'a> {
    pending: &'a PendingSet,
    key: (String, String),
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}

impl CompletionTracker {
    /// A tracker with its own pending set.
    pub fn new(today: NaiveDate) -> Self {
        Self::shared(today, PendingSet::default(), "")
    }

    /// A tracker that checks `pending` for changes started by other requests in `scope`.
    pub fn shared(today: NaiveDate, pending: PendingSet, scope: &str) -> Self {
        Self {
            today,
            scope: scope.to_string(),
            pending,
            completed: Mutex::new(HashSet::new()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn completed_set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the local set with the backend's list for today.
    pub fn reconcile<I>(&self, habit_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        *self.completed_set() = habit_ids.into_iter().collect();
    }

    pub fn is_completed(&self, habit_id: &str) -> bool {
        self.completed_set().contains(habit_id)
    }

    pub fn is_pending(&self, habit_id: &str) -> bool {
        self.pending.contains(&self.scope, habit_id)
    }

    pub fn completed(&self) -> HashSet<String> {
        self.completed_set().clone()
    }

    fn begin(&self, habit_id: &str) -> Result<Pending<'_>, TrackerError> {
        let key = (self.scope.clone(), habit_id.to_string());
        if !self.pending.lock().insert(key.clone()) {
            warn!(habit_id, "completion change already in progress");
            return Err(TrackerError::InFlight(habit_id.to_string()));
        }
        Ok(Pending {
            pending: &self.pending,
            key,
        })
    }

    pub async fn complete(&self, store: &dyn HabitStore, habit_id: &str) -> Result<(), TrackerError> {
        let _pending = self.begin(habit_id)?;
        if let Err(err) = store.complete_habit(habit_id).await {
            error!(habit_id, error = %err, "failed to complete habit");
            return Err(err.into());
        }
        self.completed_set().insert(habit_id.to_string());
        info!(habit_id, date = %self.today, "habit completed");
        Ok(())
    }

    pub async fn uncomplete(&self, store: &dyn HabitStore, habit_id: &str) -> Result<(), TrackerError> {
        let _pending = self.begin(habit_id)?;
        if let Err(err) = store.delete_completion(habit_id, self.today).await {
            error!(habit_id, error = %err, "failed to remove completion");
            return Err(err.into());
        }
        self.completed_set().remove(habit_id);
        info!(habit_id, date = %self.today, "habit completion removed");
        Ok(())
    }

    /// Flips today's completion and returns the new state.
    pub async fn toggle(&self, store: &dyn HabitStore, habit_id: &str) -> Result<bool, TrackerError> {
        if self.is_completed(habit_id) {
            self.uncomplete(store, habit_id).await?;
            Ok(false)
        } else {
            self.complete(store, habit_id).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveUpdate, Habit, HabitStats, NewHabit};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Store whose completion calls wait for a signal and can be told to fail.
    #[derive(Default)]
    struct GatedStore {
        release: Notify,
        gated: bool,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl GatedStore {
        fn record(&self, call: String) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(BackendError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl HabitStore for GatedStore {
        async fn list_habits(&self, _archived: bool) -> Result<Vec<Habit>, BackendError> {
            Ok(Vec::new())
        }
        async fn insert_habit(&self, _habit: &NewHabit) -> Result<(), BackendError> {
            Ok(())
        }
        async fn update_archival(&self, _id: &str, _update: &ArchiveUpdate) -> Result<(), BackendError> {
            Ok(())
        }
        async fn delete_habit(&self, _id: &str) -> Result<(), BackendError> {
            Ok(())
        }
        async fn completion_dates_since(&self, _id: &str, _cutoff: NaiveDate) -> Result<Vec<NaiveDate>, BackendError> {
            Ok(Vec::new())
        }
        async fn habits_completed_on(&self, _date: NaiveDate) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }
        async fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), BackendError> {
            self.record(format!("delete {habit_id} {date}"))
        }
        async fn current_streak(&self, _id: &str) -> Result<u32, BackendError> {
            Ok(0)
        }
        async fn habit_stats(&self, _id: &str) -> Result<HabitStats, BackendError> {
            Ok(HabitStats::default())
        }
        async fn complete_habit(&self, habit_id: &str) -> Result<(), BackendError> {
            if self.gated {
                self.release.notified().await;
            }
            self.record(format!("complete {habit_id}"))
        }
        async fn evolve_habit(&self, _id: &str, _text: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        "2024-03-10".parse().unwrap()
    }

    #[tokio::test]
    async fn toggle_completes_then_uncompletes() {
        let store = GatedStore::default();
        let tracker = CompletionTracker::new(today());

        assert!(tracker.toggle(&store, "a").await.unwrap());
        assert!(tracker.is_completed("a"));
        assert!(!tracker.toggle(&store, "a").await.unwrap());
        assert!(!tracker.is_completed("a"));

        let calls = store.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["complete a", "delete a 2024-03-10"]);
    }

    #[tokio::test]
    async fn failed_request_leaves_set_unchanged() {
        let store = GatedStore {
            fail: true,
            ..Default::default()
        };
        let tracker = CompletionTracker::new(today());
        tracker.reconcile(vec!["b".to_string()]);

        assert!(tracker.complete(&store, "a").await.is_err());
        assert!(tracker.uncomplete(&store, "b").await.is_err());
        assert!(!tracker.is_completed("a"));
        assert!(tracker.is_completed("b"));
        assert!(!tracker.is_pending("a"));
        assert!(!tracker.is_pending("b"));
    }

    #[tokio::test]
    async fn second_toggle_while_pending_is_rejected() {
        let store = Arc::new(GatedStore {
            gated: true,
            ..Default::default()
        });
        let tracker = Arc::new(CompletionTracker::new(today()));

        let first = {
            let store = Arc::clone(&store);
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.complete(store.as_ref(), "a").await })
        };

        while !tracker.is_pending("a") {
            tokio::task::yield_now().await;
        }
        let second = tracker.complete(store.as_ref(), "a").await;
        assert!(matches!(second, Err(TrackerError::InFlight(id)) if id == "a"));

        store.release.notify_one();
        first.await.unwrap().unwrap();

        assert!(tracker.is_completed("a"));
        assert!(!tracker.is_pending("a"));
        assert_eq!(store.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pending_set_is_shared_per_scope() {
        let gated = Arc::new(GatedStore {
            gated: true,
            ..Default::default()
        });
        let open = GatedStore::default();
        let pending = PendingSet::default();
        let first = Arc::new(CompletionTracker::shared(today(), pending.clone(), "u1"));
        let second = CompletionTracker::shared(today(), pending.clone(), "u1");
        let other_user = CompletionTracker::shared(today(), pending.clone(), "u2");

        let running = {
            let store = Arc::clone(&gated);
            let tracker = Arc::clone(&first);
            tokio::spawn(async move { tracker.complete(store.as_ref(), "a").await })
        };
        while !pending.contains("u1", "a") {
            tokio::task::yield_now().await;
        }

        assert!(second.is_pending("a"));
        let rejected = second.complete(&open, "a").await;
        assert!(matches!(rejected, Err(TrackerError::InFlight(id)) if id == "a"));
        assert!(open.calls.lock().unwrap().is_empty());

        other_user.complete(&open, "a").await.unwrap();
        assert_eq!(open.calls.lock().unwrap().len(), 1);

        gated.release.notify_one();
        running.await.unwrap().unwrap();
        assert!(pending.is_empty());
        assert!(first.is_completed("a"));
        assert!(!second.is_completed("a"));
    }

    #[test]
    fn reconcile_replaces_rather_than_merges() {
        let tracker = CompletionTracker::new(today());
        tracker.reconcile(vec!["a".to_string(), "b".to_string()]);
        tracker.reconcile(vec!["c".to_string()]);
        assert_eq!(tracker.completed(), HashSet::from(["c".to_string()]));
    }
}

use crate::models::{HabitWithStreak, SummaryStats};
use std::collections::{BTreeSet, HashSet};

/// Habits whose name contains `query` (case-insensitive) and, when a tag is
/// selected, whose tags contain it exactly. Input order is preserved.
pub fn filter_habits<'a>(
    habits: &'a [HabitWithStreak],
    query: &str,
    selected_tag: Option<&str>,
) -> Vec<&'a HabitWithStreak> {
    let needle = query.trim().to_lowercase();
    let tag = selected_tag.filter(|tag| !tag.is_empty());

    habits
        .iter()
        .filter(|item| needle.is_empty() || item.habit.name.to_lowercase().contains(&needle))
        .filter(|item| tag.is_none_or(|tag| item.habit.has_tag(tag)))
        .collect()
}

/// Unique non-empty tags across all habits, sorted ascending.
pub fn aggregate_tags(habits: &[HabitWithStreak]) -> Vec<String> {
    habits
        .iter()
        .flat_map(|item| item.habit.tags())
        .filter(|tag| !tag.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn summarize(filtered: &[&HabitWithStreak], completed_today: &HashSet<String>) -> SummaryStats {
    let total = filtered.len();
    let completed_count = filtered
        .iter()
        .filter(|item| completed_today.contains(&item.habit.id))
        .count();

    SummaryStats {
        total,
        completed_count,
        rate: completion_rate(completed_count, total),
    }
}

/// Percentage rounded half-up; zero when there is nothing to complete.
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed * 200 + total) / (total * 2)) as u8
}

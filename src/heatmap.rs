use crate::models::CalendarCell;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

pub const HEATMAP_DAYS: usize = 90;

/// Lower bound for the completion range query backing a heatmap anchored on `today`.
pub fn heatmap_cutoff(today: NaiveDate) -> NaiveDate {
    today - Duration::days(HEATMAP_DAYS as i64)
}

/// Builds the trailing window of days ending at `today`, oldest first.
///
/// Dates outside the window are ignored; the caller is expected to have
/// fetched only the range starting at [`heatmap_cutoff`].
pub fn build_heatmap(today: NaiveDate, completions: &[NaiveDate]) -> Vec<CalendarCell> {
    let completed: HashSet<NaiveDate> = completions.iter().copied().collect();

    let mut cells = Vec::with_capacity(HEATMAP_DAYS);
    for offset in (0..HEATMAP_DAYS).rev() {
        let date = today - Duration::days(offset as i64);
        cells.push(CalendarCell {
            date,
            completed: completed.contains(&date),
            is_today: date == today,
        });
    }
    cells
}

pub fn completed_cells(cells: &[CalendarCell]) -> usize {
    cells.iter().filter(|cell| cell.completed).count()
}

/// Splits the grid into columns of seven days for rendering.
pub fn week_columns(cells: &[CalendarCell]) -> Vec<&[CalendarCell]> {
    cells.chunks(7).collect()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

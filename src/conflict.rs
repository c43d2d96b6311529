//! Overlap detection between task time ranges on a single day.
//!
//! Intervals are half-open: a task ending at 10:00 does not collide with one
//! starting at 10:00.

use chrono::{NaiveDate, NaiveTime};

use crate::database::{DatabaseError, TaskStore};
use crate::models::Task;

/// Whether `[a_start, a_end)` and `[b_start, b_end)` share any instant
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}

/// First task in `tasks` whose range overlaps `[start, end)`, skipping `exclude_id`
pub fn find_conflict(
    tasks: &[Task],
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<i64>,
) -> Option<&Task> {
    tasks
        .iter()
        .filter(|existing| exclude_id.is_none() || existing.id != exclude_id)
        .find(|existing| overlaps(existing.start_time, existing.end_time, start, end))
}

/// Check a proposed range against every task stored for `date`
pub fn has_conflict<S: TaskStore>(
    store: &S,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<bool, DatabaseError> {
    let tasks = store.tasks_by_date(date)?;
    let conflict = find_conflict(&tasks, start, end, None);
    if let Some(existing) = conflict {
        tracing::debug!(
            %date,
            existing_id = existing.id,
            existing_start = %existing.start_time,
            existing_end = %existing.end_time,
            "proposed range overlaps an existing task"
        );
    }
    Ok(conflict.is_some())
}

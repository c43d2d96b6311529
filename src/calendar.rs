use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::{DatabaseError, TaskStore};
use crate::models::TaskType;
use crate::utils::days_of_month;

/// Which kinds of task fall on a calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayMarks {
    pub has_work: bool,
    pub has_personal: bool,
}

/// Marks for every day of the month containing `day` that has at least one task.
///
/// Rescans each day of the month on every call.
pub fn month_marks<S: TaskStore>(store: &S, day: NaiveDate) -> Result<BTreeMap<NaiveDate, DayMarks>, DatabaseError> {
    let mut marks = BTreeMap::new();
    for date in days_of_month(day) {
        let tasks = store.tasks_by_date(date)?;
        if tasks.is_empty() {
            continue;
        }
        marks.insert(
            date,
            DayMarks {
                has_work: tasks.iter().any(|t| t.task_type == TaskType::Work),
                has_personal: tasks.iter().any(|t| t.task_type == TaskType::Personal),
            },
        );
    }
    Ok(marks)
}

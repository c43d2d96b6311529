//! Task lifecycle: validation, conflict checking, persistence and alarm upkeep.
//!
//! Every operation runs its store and notifier calls in sequence. The single
//! live alarm per task is maintained by cancelling the stored handle before a
//! new one is requested and written.

use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

use crate::conflict;
use crate::database::{DatabaseError, TaskStore};
use crate::models::Task;
use crate::notifier::{AlarmReason, AlarmSync, Notifier};
use crate::validation::{ValidationError, validate_task};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Another task already occupies {date} {start}-{end}")]
    Conflict { date: NaiveDate, start: String, end: String },
    #[error("Task {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Store(#[from] DatabaseError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Reject edits that move a task onto another one. Off by default: only
    /// creation is conflict-checked.
    pub check_conflicts_on_update: bool,
}

pub struct TaskScheduler<S, N, C> {
    store: S,
    alarms: AlarmSync<N, C>,
    options: SchedulerOptions,
}

impl<S, N, C> TaskScheduler<S, N, C>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: Arc<C>) -> Self {
        Self {
            store,
            alarms: AlarmSync::new(notifier, clock),
            options: SchedulerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        self.alarms.notifier()
    }

    /// Whether `[start, end)` overlaps any task already stored on `date`
    pub fn has_conflict(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<bool, DatabaseError> {
        conflict::has_conflict(&self.store, date, start, end)
    }

    pub fn tasks_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        self.store.tasks_by_date(date)
    }

    pub fn get_task(&self, id: i64) -> Result<Task, SchedulerError> {
        self.store.find_task(id)?.ok_or(SchedulerError::NotFound(id))
    }

    /// Validate, conflict-check and store a new task, then schedule its alarm
    pub fn create_task(&self, mut task: Task) -> Result<Task, SchedulerError> {
        validate_task(&task)?;
        if self.has_conflict(task.date, task.start_time, task.end_time)? {
            return Err(self.conflict_error(&task));
        }

        task.id = None;
        task.notification_id = None;
        let id = self.store.insert_task(&task)?;
        task.id = Some(id);
        tracing::info!(task_id = id, date = %task.date, "task created");

        task.notification_id = self.attach_alarm(&task, AlarmReason::Created)?;
        Ok(task)
    }

    /// Store new field values for an existing task and reschedule its alarm
    pub fn update_task(&self, mut task: Task) -> Result<Task, SchedulerError> {
        validate_task(&task)?;
        let id = task.id.ok_or(ValidationError::MissingId)?;
        let previous = self.get_task(id)?;

        if self.options.check_conflicts_on_update {
            let same_day = self.store.tasks_by_date(task.date)?;
            if conflict::find_conflict(&same_day, task.start_time, task.end_time, Some(id)).is_some() {
                return Err(self.conflict_error(&task));
            }
        }

        self.alarms.cancel(previous.notification_id.as_deref());

        task.notification_id = None;
        task.created_at = previous.created_at;
        self.store.update_task(&task)?;
        tracing::info!(task_id = id, date = %task.date, "task updated");

        task.notification_id = self.attach_alarm(&task, AlarmReason::Rescheduled)?;
        Ok(task)
    }

    /// Cancel the task's alarm, then remove it. Returns false if no such task exists.
    pub fn delete_task(&self, id: i64) -> Result<bool, SchedulerError> {
        let Some(previous) = self.store.find_task(id)? else {
            return Ok(false);
        };

        self.alarms.cancel(previous.notification_id.as_deref());
        let removed = self.store.delete_task(id)?;
        tracing::info!(task_id = id, "task deleted");
        Ok(removed)
    }

    /// Set the completion flag; the alarm is left untouched
    pub fn set_completed(&self, id: i64, completed: bool) -> Result<Task, SchedulerError> {
        let mut task = self.get_task(id)?;
        self.store.set_task_completed(id, completed)?;
        task.is_completed = completed;
        Ok(task)
    }

    pub fn toggle_completed(&self, id: i64) -> Result<Task, SchedulerError> {
        let task = self.get_task(id)?;
        self.set_completed(id, !task.is_completed)
    }

    /// Schedule the alarm for a stored task and record the handle on it
    fn attach_alarm(&self, task: &Task, reason: AlarmReason) -> Result<Option<String>, SchedulerError> {
        let id = task.id.ok_or(ValidationError::MissingId)?;
        let Some(handle) = self.alarms.schedule(task, reason) else {
            return Ok(None);
        };

        if let Err(e) = self.store.set_notification_id(id, Some(&handle)) {
            // The task would never learn about this alarm; do not leave it queued.
            self.alarms.cancel(Some(&handle));
            return Err(e.into());
        }
        Ok(Some(handle))
    }

    fn conflict_error(&self, task: &Task) -> SchedulerError {
        tracing::info!(date = %task.date, start = %task.start_string(), end = %task.end_string(), "task rejected: time conflict");
        SchedulerError::Conflict {
            date: task.date,
            start: task.start_string(),
            end: task.end_string(),
        }
    }
}

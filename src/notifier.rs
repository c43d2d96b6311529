//! Keeps a task's local alarm in step with its date, start time and lead minutes.
//!
//! The notifier itself is an external collaborator. [`AlarmSync`] decides when
//! to call it: a trigger that is not strictly in the future never reaches the
//! notifier, rescheduling is always cancel-then-schedule, and notifier failures
//! are logged and swallowed so they can never fail a task operation.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

use crate::models::Task;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Failed to schedule alarm: {0}")]
    ScheduleFailed(String),
    #[error("Failed to cancel alarm {handle}: {reason}")]
    CancelFailed { handle: String, reason: String },
}

/// A service that can fire a local alarm at a given wall-clock instant
pub trait Notifier {
    /// Schedule an alarm. Returns `Ok(None)` when `trigger` is not strictly in the future.
    fn schedule(&self, title: &str, body: &str, trigger: NaiveDateTime) -> Result<Option<String>, NotifierError>;
    /// Cancel a scheduled alarm. Unknown handles are a no-op.
    fn cancel(&self, handle: &str) -> Result<(), NotifierError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn schedule(&self, title: &str, body: &str, trigger: NaiveDateTime) -> Result<Option<String>, NotifierError> {
        (**self).schedule(title, body, trigger)
    }

    fn cancel(&self, handle: &str) -> Result<(), NotifierError> {
        (**self).cancel(handle)
    }
}

/// Why an alarm is being scheduled; selects the alarm text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmReason {
    Created,
    Rescheduled,
}

impl AlarmReason {
    pub fn title(&self) -> &'static str {
        match self {
            AlarmReason::Created => "Your task is about to start",
            AlarmReason::Rescheduled => "Task rescheduled",
        }
    }
}

/// Instant an alarm should fire: start of the task minus the lead minutes.
/// `None` when no alarm was requested.
pub fn alarm_trigger(date: NaiveDate, start: NaiveTime, alarm_before: u32) -> Option<NaiveDateTime> {
    if alarm_before == 0 {
        return None;
    }
    date.and_time(start)
        .checked_sub_signed(Duration::minutes(i64::from(alarm_before)))
}

pub struct AlarmSync<N, C> {
    notifier: N,
    clock: Arc<C>,
}

impl<N, C> AlarmSync<N, C>
where
    N: Notifier,
    C: Clock,
{
    pub fn new(notifier: N, clock: Arc<C>) -> Self {
        Self { notifier, clock }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Current local wall-clock time
    pub fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    /// Trigger for `task` if it should be scheduled right now; `None` for no alarm or a past trigger
    pub fn pending_trigger(&self, task: &Task) -> Option<NaiveDateTime> {
        let trigger = alarm_trigger(task.date, task.start_time, task.alarm_before)?;
        let now = self.now();
        if trigger <= now {
            tracing::info!(
                task_id = task.id,
                %trigger,
                %now,
                "alarm trigger is not in the future; no alarm scheduled"
            );
            return None;
        }
        Some(trigger)
    }

    /// Schedule the alarm for `task`, returning the handle to store on it
    pub fn schedule(&self, task: &Task, reason: AlarmReason) -> Option<String> {
        let trigger = self.pending_trigger(task)?;
        let body = format!("{} starts at {}", task.title, task.start_string());

        match self.notifier.schedule(reason.title(), &body, trigger) {
            Ok(Some(handle)) => {
                tracing::info!(task_id = task.id, %trigger, handle = %handle, "alarm scheduled");
                Some(handle)
            }
            Ok(None) => {
                tracing::info!(task_id = task.id, %trigger, "notifier declined to schedule alarm");
                None
            }
            Err(e) => {
                tracing::warn!(task_id = task.id, error = %e, "alarm scheduling failed; task kept without alarm");
                None
            }
        }
    }

    /// Cancel a previously scheduled alarm. Absent handles make no notifier call.
    pub fn cancel(&self, handle: Option<&str>) {
        let Some(handle) = handle else {
            return;
        };
        match self.notifier.cancel(handle) {
            Ok(()) => tracing::info!(handle = %handle, "alarm cancelled"),
            Err(e) => tracing::warn!(handle = %handle, error = %e, "alarm cancellation failed; ignoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn trigger_subtracts_lead_minutes() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let trigger = alarm_trigger(date(), start, 15).unwrap();
        assert_eq!(trigger, date().and_hms_opt(8, 45, 0).unwrap());
    }

    #[test]
    fn trigger_may_cross_into_previous_day() {
        let start = NaiveTime::from_hms_opt(0, 10, 0).unwrap();
        let trigger = alarm_trigger(date(), start, 30).unwrap();
        assert_eq!(trigger, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap().and_hms_opt(23, 40, 0).unwrap());
    }

    #[test]
    fn zero_lead_means_no_alarm() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(alarm_trigger(date(), start, 0).is_none());
    }
}

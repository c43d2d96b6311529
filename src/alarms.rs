//! Local alarm queue kept in the application database.
//!
//! Handles are the queue row ids rendered as strings.

use chrono::NaiveDateTime;
use mockable::Clock;
use std::sync::Arc;

use crate::database::{Database, DatabaseError};
use crate::models::ScheduledAlarm;
use crate::notifier::{Notifier, NotifierError};

pub struct SqliteAlarms<'a, C> {
    db: &'a Database,
    clock: Arc<C>,
}

impl<'a, C: Clock> SqliteAlarms<'a, C> {
    pub fn new(db: &'a Database, clock: Arc<C>) -> Self {
        Self { db, clock }
    }

    /// Alarms not yet delivered, soonest first
    pub fn pending(&self) -> Result<Vec<ScheduledAlarm>, DatabaseError> {
        self.db.pending_alarms()
    }

    /// Deliver every alarm whose trigger has passed
    pub fn take_due(&self) -> Result<Vec<ScheduledAlarm>, DatabaseError> {
        let due = self.db.take_due_alarms(self.clock.local().naive_local())?;
        if !due.is_empty() {
            tracing::info!(count = due.len(), "delivering due alarms");
        }
        Ok(due)
    }
}

impl<C: Clock> Notifier for SqliteAlarms<'_, C> {
    fn schedule(&self, title: &str, body: &str, trigger: NaiveDateTime) -> Result<Option<String>, NotifierError> {
        if trigger <= self.clock.local().naive_local() {
            return Ok(None);
        }
        let id = self
            .db
            .insert_alarm(title, body, trigger)
            .map_err(|e| NotifierError::ScheduleFailed(e.to_string()))?;
        Ok(Some(id.to_string()))
    }

    fn cancel(&self, handle: &str) -> Result<(), NotifierError> {
        let Ok(id) = handle.parse::<i64>() else {
            tracing::debug!(handle = %handle, "ignoring cancellation of foreign alarm handle");
            return Ok(());
        };
        self.db
            .delete_alarm(id)
            .map(|_| ())
            .map_err(|e| NotifierError::CancelFailed {
                handle: handle.to_string(),
                reason: e.to_string(),
            })
    }
}

#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use dayplan::notifier::{Notifier, NotifierError};
use dayplan::{Database, Task, TaskType};
use mockable::Clock;
use std::cell::RefCell;
use std::sync::Mutex;

/// Clock frozen at a local wall-clock instant, movable by tests
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        Local.from_local_datetime(&self.now()).earliest().unwrap()
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Schedule { title: String, body: String, trigger: NaiveDateTime },
    Cancel(String),
}

/// Notifier double that records every call and hands out sequential handles
#[derive(Default)]
pub struct RecordingNotifier {
    calls: RefCell<Vec<Call>>,
    next: RefCell<u32>,
    pub fail_schedule: bool,
    pub fail_cancel: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_schedule() -> Self {
        Self { fail_schedule: true, ..Self::default() }
    }

    pub fn failing_cancel() -> Self {
        Self { fail_cancel: true, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn cancellations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Cancel(handle) => Some(handle.clone()),
                Call::Schedule { .. } => None,
            })
            .collect()
    }

    pub fn schedules(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, Call::Schedule { .. })).count()
    }
}

impl Notifier for RecordingNotifier {
    fn schedule(&self, title: &str, body: &str, trigger: NaiveDateTime) -> Result<Option<String>, NotifierError> {
        self.calls.borrow_mut().push(Call::Schedule {
            title: title.to_string(),
            body: body.to_string(),
            trigger,
        });
        if self.fail_schedule {
            return Err(NotifierError::ScheduleFailed("notifier offline".to_string()));
        }
        let mut next = self.next.borrow_mut();
        *next += 1;
        Ok(Some(format!("alarm-{}", *next)))
    }

    fn cancel(&self, handle: &str) -> Result<(), NotifierError> {
        self.calls.borrow_mut().push(Call::Cancel(handle.to_string()));
        if self.fail_cancel {
            return Err(NotifierError::CancelFailed {
                handle: handle.to_string(),
                reason: "notifier offline".to_string(),
            });
        }
        Ok(())
    }
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Noon on the test day
pub fn noon() -> NaiveDateTime {
    day().and_time(hm(12, 0))
}

pub fn task_at(title: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Task {
    Task::new(title.to_string(), date, start, end)
}

pub fn task_with_alarm(title: &str, start: NaiveTime, end: NaiveTime, alarm_before: u32) -> Task {
    let mut task = task_at(title, day(), start, end);
    task.alarm_before = alarm_before;
    task.task_type = TaskType::Personal;
    task
}

pub fn memory_db() -> Database {
    Database::open_in_memory().unwrap()
}

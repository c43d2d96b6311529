use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage format for task dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for task start/end times (24-hour, minute precision)
pub const TIME_FORMAT: &str = "%H:%M";

fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Work,
    Personal,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Work => "work",
            TaskType::Personal => "personal",
        }
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Work
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TaskType::Work),
            "personal" => Ok(TaskType::Personal),
            other => Err(format!("unknown task type '{}', expected work or personal", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub alarm_before: u32, // minutes, 0 = no alarm
    pub task_type: TaskType,
    pub is_completed: bool,
    pub notification_id: Option<String>,
    pub created_at: String,
}

impl Task {
    pub fn new(title: String, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: None,
            title,
            description: None,
            date,
            start_time,
            end_time,
            alarm_before: 0,
            task_type: TaskType::default(),
            is_completed: false,
            notification_id: None,
            created_at: timestamp_now(),
        }
    }

    /// The wall-clock instant at which the task begins
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// Date formatted the way it is stored
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn start_string(&self) -> String {
        self.start_time.format(TIME_FORMAT).to_string()
    }

    pub fn end_string(&self) -> String {
        self.end_time.format(TIME_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl Note {
    pub fn new(content: String) -> Self {
        Self {
            id: None,
            title: None,
            content,
            created_at: timestamp_now(),
        }
    }
}

/// Direction of money flow for a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// Apply this kind's sign to an amount, ignoring the sign it came with
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Expense => -amount.abs(),
            TransactionKind::Income => amount.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub amount: f64, // negative for expenses
    pub category: String,
    pub description: Option<String>,
    pub date: String,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: f64, category: String) -> Self {
        Self {
            id: None,
            amount: kind.signed(amount),
            category,
            description: None,
            date: timestamp_now(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        if self.amount < 0.0 {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }
}

/// A local alarm queued by the built-in notifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAlarm {
    pub handle: String,
    pub title: String,
    pub body: String,
    pub trigger_at: NaiveDateTime,
    pub delivered: bool,
}

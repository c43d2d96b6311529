use chrono::{Duration, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use mockable::Clock;
use thiserror::Error;

use crate::alarms::SqliteAlarms;
use crate::calendar::month_marks;
use crate::config::Config;
use crate::database::{Database, DatabaseError, TaskStore};
use crate::ledger::{LedgerError, record_transaction, summarize};
use crate::models::{Note, Task, TaskType, TransactionKind};
use crate::notifier::Notifier;
use crate::scheduler::{SchedulerError, TaskScheduler};
use crate::utils::{get_current_date, normalize_alarm_before, parse_date, parse_month, parse_time};
use crate::validation::ValidationError;

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "Tasks with alarms, notes and a money ledger - a small local planner")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task; rejected if it overlaps another task that day
    AddTask {
        /// Task title
        title: String,
        /// Day of the task (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM), defaults to one hour after start
        #[arg(long)]
        end: Option<String>,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Minutes before start to raise an alarm (0 for none)
        #[arg(long, allow_negative_numbers = true)]
        alarm: Option<String>,
        /// work or personal
        #[arg(long = "type")]
        task_type: Option<String>,
    },
    /// Change fields of an existing task and reschedule its alarm
    EditTask {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        alarm: Option<String>,
        #[arg(long = "type")]
        task_type: Option<String>,
    },
    /// Flip a task between done and not done
    ToggleTask { id: i64 },
    /// Delete a task and cancel its alarm
    DeleteTask { id: i64 },
    /// List the tasks of a day
    Tasks {
        /// Day to list (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show which days of a month have work or personal tasks
    Calendar {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// List queued alarms, or deliver the ones that are due
    Alarms {
        #[arg(long)]
        fire: bool,
    },
    /// Add a note
    AddNote {
        content: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// List notes, newest first
    Notes {
        #[arg(long)]
        json: bool,
    },
    /// Delete a note
    DeleteNote { id: i64 },
    /// Record money spent
    AddExpense {
        #[arg(allow_negative_numbers = true)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Record money received
    AddIncome {
        #[arg(allow_negative_numbers = true)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List ledger entries and the running balance
    Finance {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error(transparent)]
    SchedulerError(#[from] SchedulerError),
    #[error(transparent)]
    LedgerError(#[from] LedgerError),
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
}

/// Scheduler wired to the application database and its alarm queue
pub type AppScheduler<'a, C> = TaskScheduler<&'a Database, SqliteAlarms<'a, C>, C>;

pub fn build_scheduler<'a, C: Clock>(db: &'a Database, config: &Config, clock: std::sync::Arc<C>) -> AppScheduler<'a, C> {
    TaskScheduler::new(db, SqliteAlarms::new(db, clock.clone()), clock)
        .with_options(config.scheduler_options())
}

fn date_arg(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match raw {
        Some(raw) => parse_date(raw).map_err(|_| ValidationError::InvalidDate(raw.to_string())),
        None => Ok(get_current_date()),
    }
}

fn time_arg(raw: &str) -> Result<NaiveTime, ValidationError> {
    parse_time(raw).map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

fn type_arg(raw: Option<&str>, fallback: TaskType) -> Result<TaskType, ValidationError> {
    match raw {
        Some(raw) => raw.parse().map_err(|_| ValidationError::InvalidTaskType(raw.to_string())),
        None => Ok(fallback),
    }
}

/// One hour after `start`, kept on the same day
pub fn default_end_time(start: NaiveTime) -> NaiveTime {
    let last_minute = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
    match start.overflowing_add_signed(Duration::hours(1)) {
        (end, 0) => end,
        _ => last_minute,
    }
}

/// One-line rendering of a task for list output
pub fn format_task(task: &Task) -> String {
    let mut line = format!(
        "[{}] #{} {}-{} {:<8} {}",
        if task.is_completed { "x" } else { " " },
        task.id.unwrap_or_default(),
        task.start_string(),
        task.end_string(),
        task.task_type,
        task.title
    );
    if task.alarm_before > 0 {
        let state = if task.notification_id.is_some() { "set" } else { "not set" };
        line.push_str(&format!(" (alarm {}m before, {})", task.alarm_before, state));
    }
    line
}

/// Handle the add-task command
#[allow(clippy::too_many_arguments)]
pub fn handle_add_task<S, N, C>(
    title: String,
    date: Option<String>,
    start: String,
    end: Option<String>,
    description: Option<String>,
    alarm: Option<String>,
    task_type: Option<String>,
    config: &Config,
    scheduler: &TaskScheduler<S, N, C>,
) -> Result<Task, CliError>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    let date = date_arg(date.as_deref())?;
    let start_time = time_arg(&start)?;
    let end_time = match end {
        Some(end) => time_arg(&end)?,
        None => default_end_time(start_time),
    };

    let mut task = Task::new(title.trim().to_string(), date, start_time, end_time);
    task.description = description.filter(|d| !d.trim().is_empty());
    task.alarm_before = alarm
        .as_deref()
        .map(normalize_alarm_before)
        .unwrap_or(config.default_alarm_before);
    task.task_type = type_arg(task_type.as_deref(), config.default_task_type)?;

    let task = scheduler.create_task(task)?;
    println!("Task created successfully (ID: {})", task.id.unwrap_or_default());
    if task.alarm_before > 0 && task.notification_id.is_none() {
        println!("No alarm scheduled: the alarm time has already passed");
    }
    Ok(task)
}

/// Handle the edit-task command
#[allow(clippy::too_many_arguments)]
pub fn handle_edit_task<S, N, C>(
    id: i64,
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    start: Option<String>,
    end: Option<String>,
    alarm: Option<String>,
    task_type: Option<String>,
    scheduler: &TaskScheduler<S, N, C>,
) -> Result<Task, CliError>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    let mut task = scheduler.get_task(id)?;

    if let Some(title) = title {
        task.title = title.trim().to_string();
    }
    if let Some(description) = description {
        task.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if date.is_some() {
        task.date = date_arg(date.as_deref())?;
    }
    if let Some(start) = start {
        task.start_time = time_arg(&start)?;
    }
    if let Some(end) = end {
        task.end_time = time_arg(&end)?;
    }
    if let Some(alarm) = alarm {
        task.alarm_before = normalize_alarm_before(&alarm);
    }
    task.task_type = type_arg(task_type.as_deref(), task.task_type)?;

    let task = scheduler.update_task(task)?;
    println!("Task {} updated", id);
    Ok(task)
}

pub fn handle_toggle_task<S, N, C>(id: i64, scheduler: &TaskScheduler<S, N, C>) -> Result<Task, CliError>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    let task = scheduler.toggle_completed(id)?;
    println!(
        "Task {} marked as {}",
        id,
        if task.is_completed { "done" } else { "not done" }
    );
    Ok(task)
}

pub fn handle_delete_task<S, N, C>(id: i64, scheduler: &TaskScheduler<S, N, C>) -> Result<(), CliError>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    if !scheduler.delete_task(id)? {
        return Err(CliError::NotFound(format!("Task {}", id)));
    }
    println!("Task {} deleted", id);
    Ok(())
}

pub fn handle_list_tasks<S, N, C>(date: Option<String>, json: bool, scheduler: &TaskScheduler<S, N, C>) -> Result<(), CliError>
where
    S: TaskStore,
    N: Notifier,
    C: Clock,
{
    let date = date_arg(date.as_deref())?;
    let tasks = scheduler.tasks_for_date(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks on {}", date);
    }
    for task in &tasks {
        println!("{}", format_task(task));
    }
    Ok(())
}

pub fn handle_calendar<S: TaskStore>(month: Option<String>, store: &S) -> Result<(), CliError> {
    let first_day = match month {
        Some(raw) => parse_month(&raw).map_err(|_| ValidationError::InvalidDate(raw.clone()))?,
        None => get_current_date(),
    };

    let marks = month_marks(store, first_day)?;
    if marks.is_empty() {
        println!("No tasks this month");
    }
    for (date, mark) in marks {
        let mut kinds = Vec::new();
        if mark.has_work {
            kinds.push("work");
        }
        if mark.has_personal {
            kinds.push("personal");
        }
        println!("{}  {}", date, kinds.join(", "));
    }
    Ok(())
}

pub fn handle_alarms<C: Clock>(fire: bool, alarms: &SqliteAlarms<'_, C>) -> Result<(), CliError> {
    if fire {
        for alarm in alarms.take_due()? {
            println!("ALARM {}: {} - {}", alarm.trigger_at.format("%Y-%m-%d %H:%M"), alarm.title, alarm.body);
        }
        return Ok(());
    }

    let pending = alarms.pending()?;
    if pending.is_empty() {
        println!("No alarms scheduled");
    }
    for alarm in pending {
        println!("#{} {}  {}", alarm.handle, alarm.trigger_at.format("%Y-%m-%d %H:%M"), alarm.body);
    }
    Ok(())
}

/// Handle the add-note command
pub fn handle_add_note(content: String, title: Option<String>, db: &Database) -> Result<i64, CliError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyNote.into());
    }

    let mut note = Note::new(content);
    note.title = title.filter(|t| !t.trim().is_empty());

    let id = db.insert_note(&note)?;
    println!("Note created successfully (ID: {})", id);
    Ok(id)
}

pub fn handle_list_notes(json: bool, db: &Database) -> Result<(), CliError> {
    let notes = db.get_all_notes()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    for note in notes {
        let title = note.title.as_deref().unwrap_or("(untitled)");
        println!("#{} {}  {}", note.id.unwrap_or_default(), note.created_at, title);
        println!("    {}", note.content);
    }
    Ok(())
}

pub fn handle_delete_note(id: i64, db: &Database) -> Result<(), CliError> {
    if !db.delete_note(id)? {
        return Err(CliError::NotFound(format!("Note {}", id)));
    }
    println!("Note {} deleted", id);
    Ok(())
}

pub fn handle_add_transaction(
    kind: TransactionKind,
    amount: String,
    category: String,
    description: Option<String>,
    db: &Database,
) -> Result<(), CliError> {
    let transaction = record_transaction(db, kind, &amount, &category, description)?;
    println!(
        "Transaction registered (ID: {}): {:+.2} {}",
        transaction.id.unwrap_or_default(),
        transaction.amount,
        transaction.category
    );
    Ok(())
}

pub fn handle_finance(json: bool, db: &Database) -> Result<(), CliError> {
    let transactions = db.get_all_transactions()?;
    let summary = summarize(&transactions);

    if json {
        let payload = serde_json::json!({ "summary": summary, "transactions": transactions });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for t in &transactions {
        println!(
            "#{} {}  {:+10.2}  {}{}",
            t.id.unwrap_or_default(),
            t.date,
            t.amount,
            t.category,
            t.description.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default()
        );
    }
    println!(
        "Income {:.2}  Expenses {:.2}  Balance {:.2}",
        summary.income, summary.expenses, summary.balance
    );
    Ok(())
}

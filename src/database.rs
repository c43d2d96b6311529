use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{DATE_FORMAT, Note, ScheduledAlarm, Task, TaskType, TIME_FORMAT, Transaction};

/// Storage format for alarm trigger instants (local wall-clock time)
const TRIGGER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TASK_COLUMNS: &str = "id, title, description, date, start_time, end_time, alarm_before, \
     task_type, is_completed, notification_id, created_at";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Record has no id; it must be inserted before it can be updated")]
    MissingId,
}

/// Persistence operations the task scheduler depends on
pub trait TaskStore {
    /// Insert a task and return the id assigned by the store
    fn insert_task(&self, task: &Task) -> Result<i64, DatabaseError>;
    /// Overwrite every stored field of an existing task
    fn update_task(&self, task: &Task) -> Result<(), DatabaseError>;
    /// Delete a task; returns whether a row was removed
    fn delete_task(&self, id: i64) -> Result<bool, DatabaseError>;
    /// All tasks on the given date, ordered by start time
    fn tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError>;
    fn find_task(&self, id: i64) -> Result<Option<Task>, DatabaseError>;
    fn set_task_completed(&self, id: i64, completed: bool) -> Result<(), DatabaseError>;
    fn set_notification_id(&self, id: i64, handle: Option<&str>) -> Result<(), DatabaseError>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    fn insert_task(&self, task: &Task) -> Result<i64, DatabaseError> {
        (**self).insert_task(task)
    }

    fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        (**self).update_task(task)
    }

    fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        (**self).delete_task(id)
    }

    fn tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        (**self).tasks_by_date(date)
    }

    fn find_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        (**self).find_task(id)
    }

    fn set_task_completed(&self, id: i64, completed: bool) -> Result<(), DatabaseError> {
        (**self).set_task_completed(id, completed)
    }

    fn set_notification_id(&self, id: i64, handle: Option<&str>) -> Result<(), DatabaseError> {
        (**self).set_notification_id(id, handle)
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

        let db = Database { conn };
        db.initialize_schema()?;
        tracing::info!(path = %db_path.display(), "database opened");

        Ok(db)
    }

    /// Open a private in-memory database with the full schema
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT,
                date            TEXT NOT NULL,
                start_time      TEXT NOT NULL,
                end_time        TEXT NOT NULL,
                alarm_before    INTEGER,
                -- rows written before task types existed were personal entries
                task_type       TEXT NOT NULL DEFAULT 'personal',
                is_completed    INTEGER DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT,
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                amount          REAL NOT NULL,
                category        TEXT NOT NULL,
                description     TEXT,
                date            TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS scheduled_alarms (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                body            TEXT NOT NULL,
                trigger_at      TEXT NOT NULL,
                delivered       INTEGER DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_alarms_trigger_at ON scheduled_alarms(trigger_at);",
        )?;

        // Databases created before alarms existed lack the handle column
        self.migrate_add_notification_id()?;

        Ok(())
    }

    /// Migrate the tasks table to carry a notification handle
    fn migrate_add_notification_id(&self) -> Result<(), DatabaseError> {
        fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2"
            )?;
            let count: i64 = stmt.query_row(rusqlite::params![table, column], |row| row.get(0))?;
            Ok(count > 0)
        }

        if !column_exists(&self.conn, "tasks", "notification_id")? {
            self.conn.execute("ALTER TABLE tasks ADD COLUMN notification_id TEXT", [])?;
            tracing::info!("added notification_id column to tasks table");
        }

        let backfilled = self.conn.execute(
            "UPDATE tasks SET is_completed = 0 WHERE is_completed IS NULL",
            [],
        )?;
        if backfilled > 0 {
            tracing::info!(rows = backfilled, "backfilled missing completion flags");
        }

        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        fn conversion<E>(idx: usize, err: E) -> rusqlite::Error
        where
            E: Into<Box<dyn std::error::Error + Send + Sync>>,
        {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
        }

        let date: String = row.get(3)?;
        let start: String = row.get(4)?;
        let end: String = row.get(5)?;
        let task_type: String = row.get(7)?;
        let alarm_before: Option<i64> = row.get(6)?;

        Ok(Task {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| conversion(3, e))?,
            start_time: chrono::NaiveTime::parse_from_str(&start, TIME_FORMAT)
                .map_err(|e| conversion(4, e))?,
            end_time: chrono::NaiveTime::parse_from_str(&end, TIME_FORMAT)
                .map_err(|e| conversion(5, e))?,
            alarm_before: alarm_before
                .map(|m| m.clamp(0, i64::from(u32::MAX)) as u32)
                .unwrap_or(0),
            task_type: task_type.parse::<TaskType>().map_err(|e| conversion(7, e))?,
            is_completed: row.get::<_, Option<i64>>(8)?.unwrap_or(0) != 0,
            notification_id: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    /// Get all notes, newest first
    pub fn get_all_notes(&self) -> Result<Vec<Note>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, created_at FROM notes ORDER BY created_at DESC, id DESC"
        )?;
        let notes = stmt.query_map([], Self::row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Helper function to map a row to a Note
    fn row_to_note(row: &rusqlite::Row) -> Result<Note, rusqlite::Error> {
        Ok(Note {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    /// Insert a note into the database and return its ID
    pub fn insert_note(&self, note: &Note) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO notes (title, content, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![note.title, note.content, note.created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a single note by ID
    pub fn get_note(&self, id: i64) -> Result<Option<Note>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, title, content, created_at FROM notes WHERE id = ?1",
            rusqlite::params![id],
            Self::row_to_note,
        );

        match result {
            Ok(note) => Ok(Some(note)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Delete a note by ID
    pub fn delete_note(&self, id: i64) -> Result<bool, DatabaseError> {
        let removed = self.conn.execute("DELETE FROM notes WHERE id = ?1", rusqlite::params![id])?;
        Ok(removed > 0)
    }

    /// Insert a ledger entry and return its ID
    pub fn insert_transaction(&self, transaction: &Transaction) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO transactions (amount, category, description, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                transaction.amount,
                transaction.category,
                transaction.description,
                transaction.date
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all ledger entries, newest first
    pub fn get_all_transactions(&self) -> Result<Vec<Transaction>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, category, description, date FROM transactions ORDER BY date DESC, id DESC"
        )?;
        let transactions = stmt.query_map([], |row| {
            Ok(Transaction {
                id: Some(row.get(0)?),
                amount: row.get(1)?,
                category: row.get(2)?,
                description: row.get(3)?,
                date: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Sum of every ledger entry
    pub fn get_balance(&self) -> Result<f64, DatabaseError> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM transactions",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Queue an alarm and return its row id
    pub fn insert_alarm(&self, title: &str, body: &str, trigger_at: NaiveDateTime) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO scheduled_alarms (title, body, trigger_at, delivered, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![
                title,
                body,
                trigger_at.format(TRIGGER_FORMAT).to_string(),
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Remove a queued alarm; returns whether it existed
    pub fn delete_alarm(&self, id: i64) -> Result<bool, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM scheduled_alarms WHERE id = ?1",
            rusqlite::params![id],
        )?;
        Ok(removed > 0)
    }

    fn row_to_alarm(row: &rusqlite::Row) -> Result<ScheduledAlarm, rusqlite::Error> {
        let trigger: String = row.get(3)?;
        Ok(ScheduledAlarm {
            handle: row.get::<_, i64>(0)?.to_string(),
            title: row.get(1)?,
            body: row.get(2)?,
            trigger_at: NaiveDateTime::parse_from_str(&trigger, TRIGGER_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?,
            delivered: row.get::<_, i64>(4)? != 0,
        })
    }

    /// Alarms that have not been delivered yet, soonest first
    pub fn pending_alarms(&self) -> Result<Vec<ScheduledAlarm>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, trigger_at, delivered FROM scheduled_alarms
             WHERE delivered = 0 ORDER BY trigger_at ASC, id ASC"
        )?;
        let alarms = stmt.query_map([], Self::row_to_alarm)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(alarms)
    }

    /// Mark every undelivered alarm due at or before `now` as delivered and return them
    pub fn take_due_alarms(&self, now: NaiveDateTime) -> Result<Vec<ScheduledAlarm>, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let due = {
            let mut stmt = tx.prepare(
                "SELECT id, title, body, trigger_at, delivered FROM scheduled_alarms
                 WHERE delivered = 0 AND trigger_at <= ?1 ORDER BY trigger_at ASC, id ASC"
            )?;
            stmt.query_map(
                rusqlite::params![now.format(TRIGGER_FORMAT).to_string()],
                Self::row_to_alarm,
            )?
            .collect::<Result<Vec<_>, _>>()?
        };
        tx.execute(
            "UPDATE scheduled_alarms SET delivered = 1 WHERE delivered = 0 AND trigger_at <= ?1",
            rusqlite::params![now.format(TRIGGER_FORMAT).to_string()],
        )?;
        tx.commit()?;
        Ok(due.into_iter().map(|alarm| ScheduledAlarm { delivered: true, ..alarm }).collect())
    }
}

impl TaskStore for Database {
    fn insert_task(&self, task: &Task) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (title, description, date, start_time, end_time, alarm_before,
                                task_type, is_completed, notification_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                task.title,
                task.description,
                task.date_string(),
                task.start_string(),
                task.end_string(),
                task.alarm_before,
                task.task_type.as_str(),
                if task.is_completed { 1 } else { 0 },
                task.notification_id,
                task.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let id = task.id.ok_or(DatabaseError::MissingId)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, date = ?3, start_time = ?4,
             end_time = ?5, alarm_before = ?6, task_type = ?7, is_completed = ?8,
             notification_id = ?9 WHERE id = ?10",
            rusqlite::params![
                task.title,
                task.description,
                task.date_string(),
                task.start_string(),
                task.end_string(),
                task.alarm_before,
                task.task_type.as_str(),
                if task.is_completed { 1 } else { 0 },
                task.notification_id,
                id
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn tasks_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE date = ?1 ORDER BY start_time ASC, id ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(rusqlite::params![date.format(DATE_FORMAT).to_string()], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn find_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
            rusqlite::params![id],
            Self::row_to_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    fn set_task_completed(&self, id: i64, completed: bool) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET is_completed = ?1 WHERE id = ?2",
            rusqlite::params![if completed { 1 } else { 0 }, id],
        )?;
        Ok(())
    }

    fn set_notification_id(&self, id: i64, handle: Option<&str>) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET notification_id = ?1 WHERE id = ?2",
            rusqlite::params![handle, id],
        )?;
        Ok(())
    }
}

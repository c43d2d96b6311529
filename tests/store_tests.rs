mod common;

use common::{day, hm, memory_db, task_at};
use dayplan::{Database, Note, TaskStore, TaskType};
use rusqlite::Connection;

#[test]
fn task_round_trips_every_field() {
    let db = memory_db();
    let mut task = task_at("Quarterly review", day(), hm(15, 30), hm(16, 45));
    task.description = Some("Bring the numbers".to_string());
    task.alarm_before = 20;
    task.task_type = TaskType::Work;
    task.is_completed = true;
    task.notification_id = Some("alarm-9".to_string());

    let id = db.insert_task(&task).unwrap();
    task.id = Some(id);

    let fetched = db.tasks_by_date(day()).unwrap();
    assert_eq!(fetched, vec![task.clone()]);
    assert_eq!(db.find_task(id).unwrap(), Some(task));
}

#[test]
fn update_overwrites_fields_including_handle() {
    let db = memory_db();
    let mut task = task_at("Draft", day(), hm(9, 0), hm(10, 0));
    task.notification_id = Some("alarm-1".to_string());
    task.id = Some(db.insert_task(&task).unwrap());

    task.title = "Final".to_string();
    task.task_type = TaskType::Personal;
    task.notification_id = None;
    db.update_task(&task).unwrap();

    assert_eq!(db.find_task(task.id.unwrap()).unwrap(), Some(task));
}

#[test]
fn update_without_id_is_rejected() {
    let db = memory_db();
    let task = task_at("Unsaved", day(), hm(9, 0), hm(10, 0));
    assert!(db.update_task(&task).is_err());
}

#[test]
fn tasks_by_date_orders_by_start_time() {
    let db = memory_db();
    db.insert_task(&task_at("Late", day(), hm(18, 0), hm(19, 0))).unwrap();
    db.insert_task(&task_at("Early", day(), hm(7, 0), hm(8, 0))).unwrap();
    db.insert_task(&task_at("Tomorrow", day().succ_opt().unwrap(), hm(6, 0), hm(7, 0))).unwrap();

    let titles: Vec<String> = db.tasks_by_date(day()).unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Early", "Late"]);
}

#[test]
fn completion_and_handle_setters_touch_only_their_column() {
    let db = memory_db();
    let task = task_at("Water plants", day(), hm(8, 0), hm(8, 15));
    let id = db.insert_task(&task).unwrap();

    db.set_task_completed(id, true).unwrap();
    db.set_notification_id(id, Some("alarm-3")).unwrap();

    let stored = db.find_task(id).unwrap().unwrap();
    assert!(stored.is_completed);
    assert_eq!(stored.notification_id.as_deref(), Some("alarm-3"));
    assert_eq!(stored.title, task.title);
    assert_eq!(stored.start_time, task.start_time);
}

#[test]
fn legacy_database_gains_handle_column_and_null_alarm_reads_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                alarm_before INTEGER,
                task_type TEXT NOT NULL DEFAULT 'personal',
                is_completed INTEGER DEFAULT 0,
                created_at TEXT NOT NULL
            );
            INSERT INTO tasks (title, date, start_time, end_time, alarm_before, created_at)
            VALUES ('Old task', '2026-03-10', '09:00', '10:00', NULL, '2025-12-01 08:00:00');",
        )
        .unwrap();
    }

    let db = Database::new(path.to_str().unwrap()).unwrap();
    let tasks = db.tasks_by_date(day()).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].alarm_before, 0);
    assert_eq!(tasks[0].task_type, TaskType::Personal);
    assert!(tasks[0].notification_id.is_none());
}

#[test]
fn null_completion_flags_read_as_open_and_are_backfilled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                alarm_before INTEGER,
                task_type TEXT NOT NULL DEFAULT 'personal',
                is_completed INTEGER,
                created_at TEXT NOT NULL
            );
            INSERT INTO tasks (title, date, start_time, end_time, is_completed, created_at)
            VALUES ('Unflagged', '2026-03-10', '09:00', '10:00', NULL, '2025-12-01 08:00:00');",
        )
        .unwrap();
    }

    let db = Database::new(path.to_str().unwrap()).unwrap();
    let null_rows: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM tasks WHERE is_completed IS NULL", [], |row| row.get(0))
        .unwrap();
    assert_eq!(null_rows, 0);

    db.conn().execute("UPDATE tasks SET is_completed = NULL", []).unwrap();
    let tasks = db.tasks_by_date(day()).unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(!tasks[0].is_completed);
}

#[test]
fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("dayplan.db");
    let path = path.to_str().unwrap();

    let id = {
        let db = Database::new(path).unwrap();
        db.insert_task(&task_at("Persisted", day(), hm(9, 0), hm(10, 0))).unwrap()
    };

    let db = Database::new(path).unwrap();
    assert_eq!(db.find_task(id).unwrap().unwrap().title, "Persisted");
}

#[test]
fn notes_are_listed_newest_first_and_deletable() {
    let db = memory_db();
    let mut first = Note::new("Buy milk".to_string());
    first.created_at = "2026-03-01 10:00:00".to_string();
    let mut second = Note::new("Call mum".to_string());
    second.title = Some("Family".to_string());
    second.created_at = "2026-03-02 10:00:00".to_string();

    let first_id = db.insert_note(&first).unwrap();
    let second_id = db.insert_note(&second).unwrap();

    let notes = db.get_all_notes().unwrap();
    assert_eq!(notes.iter().map(|n| n.id.unwrap()).collect::<Vec<_>>(), vec![second_id, first_id]);
    assert_eq!(db.get_note(second_id).unwrap().unwrap().title.as_deref(), Some("Family"));

    assert!(db.delete_note(first_id).unwrap());
    assert!(!db.delete_note(first_id).unwrap());
    assert!(db.get_note(first_id).unwrap().is_none());
}

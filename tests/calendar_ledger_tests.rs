mod common;

use chrono::NaiveDate;
use common::{hm, memory_db, task_at};
use dayplan::calendar::{DayMarks, month_marks};
use dayplan::ledger::{LedgerError, record_transaction, summarize};
use dayplan::validation::ValidationError;
use dayplan::{TaskStore, TaskType, TransactionKind};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn month_marks_report_task_kinds_per_day() {
    let db = memory_db();
    let mut work = task_at("Report", date(2026, 4, 3), hm(9, 0), hm(10, 0));
    work.task_type = TaskType::Work;
    let mut personal = task_at("Run", date(2026, 4, 3), hm(18, 0), hm(19, 0));
    personal.task_type = TaskType::Personal;
    let mut month_end = task_at("Pay bills", date(2026, 4, 30), hm(8, 0), hm(8, 30));
    month_end.task_type = TaskType::Personal;
    let next_month = task_at("Elsewhere", date(2026, 5, 1), hm(8, 0), hm(9, 0));
    for task in [&work, &personal, &month_end, &next_month] {
        db.insert_task(task).unwrap();
    }

    let marks = month_marks(&db, date(2026, 4, 17)).unwrap();

    assert_eq!(marks.len(), 2);
    assert_eq!(marks[&date(2026, 4, 3)], DayMarks { has_work: true, has_personal: true });
    assert_eq!(marks[&date(2026, 4, 30)], DayMarks { has_work: false, has_personal: true });
}

#[test]
fn ledger_signs_amounts_by_kind_and_sums_balance() {
    let db = memory_db();
    record_transaction(&db, TransactionKind::Income, "1500", "Salary", None).unwrap();
    record_transaction(&db, TransactionKind::Expense, "42.5", "Food", Some("Groceries".to_string())).unwrap();
    record_transaction(&db, TransactionKind::Expense, "-7.5", "Transport", None).unwrap();

    let transactions = db.get_all_transactions().unwrap();
    assert_eq!(transactions.len(), 3);
    assert!(transactions.iter().any(|t| t.category == "Food" && t.amount == -42.5));
    assert!(transactions.iter().any(|t| t.category == "Transport" && t.amount == -7.5));

    assert_eq!(db.get_balance().unwrap(), 1450.0);
    let summary = summarize(&transactions);
    assert_eq!(summary.income, 1500.0);
    assert_eq!(summary.expenses, 50.0);
    assert_eq!(summary.balance, 1450.0);
}

#[test]
fn ledger_rejects_bad_input_before_writing() {
    let db = memory_db();

    let zero = record_transaction(&db, TransactionKind::Expense, "0", "Food", None);
    assert!(matches!(zero, Err(LedgerError::Validation(ValidationError::InvalidAmount(_)))));

    let garbage = record_transaction(&db, TransactionKind::Expense, "lots", "Food", None);
    assert!(matches!(garbage, Err(LedgerError::Validation(ValidationError::InvalidAmount(_)))));

    let uncategorized = record_transaction(&db, TransactionKind::Income, "10", "  ", None);
    assert!(matches!(uncategorized, Err(LedgerError::Validation(ValidationError::MissingCategory))));

    assert!(db.get_all_transactions().unwrap().is_empty());
    assert_eq!(db.get_balance().unwrap(), 0.0);
}

pub mod alarms;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod database;
pub mod ledger;
pub mod models;
pub mod notifier;
pub mod scheduler;
pub mod utils;
pub mod validation;

pub use alarms::SqliteAlarms;
pub use config::Config;
pub use database::{Database, DatabaseError, TaskStore};
pub use models::{Note, Task, TaskType, Transaction, TransactionKind};
pub use notifier::{Notifier, NotifierError};
pub use scheduler::{SchedulerError, SchedulerOptions, TaskScheduler};
pub use utils::Profile;

use thiserror::Error;

use crate::models::Task;

/// Input rejected before anything is written
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Start time {start} must be before end time {end}")]
    StartNotBeforeEnd { start: String, end: String },
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time '{0}': expected HH:MM (24-hour)")]
    InvalidTime(String),
    #[error("Invalid task type '{0}': expected work or personal")]
    InvalidTaskType(String),
    #[error("Task has no id; save it before editing")]
    MissingId,
    #[error("Amount must be a non-zero number, got '{0}'")]
    InvalidAmount(String),
    #[error("Category is required")]
    MissingCategory,
    #[error("Note content is required")]
    EmptyNote,
}

/// Check the fields every stored task must satisfy
pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if task.start_time >= task.end_time {
        return Err(ValidationError::StartNotBeforeEnd {
            start: task.start_string(),
            end: task.end_string(),
        });
    }
    Ok(())
}

/// Parse a user-entered money amount; zero, NaN and infinities are rejected
pub fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount != 0.0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount(raw.to_string())),
    }
}

use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::{Transaction, TransactionKind};
use crate::validation::{ValidationError, parse_amount};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Validate and store an expense or income entry
pub fn record_transaction(
    db: &Database,
    kind: TransactionKind,
    raw_amount: &str,
    category: &str,
    description: Option<String>,
) -> Result<Transaction, LedgerError> {
    let amount = parse_amount(raw_amount)?;
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::MissingCategory.into());
    }

    let mut transaction = Transaction::new(kind, amount, category.to_string());
    transaction.description = description.filter(|d| !d.trim().is_empty());
    let id = db.insert_transaction(&transaction)?;
    transaction.id = Some(id);
    tracing::info!(transaction_id = id, amount = transaction.amount, "transaction recorded");
    Ok(transaction)
}

/// Ledger totals
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Summary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    transactions.iter().fold(Summary::default(), |mut acc, t| {
        match t.kind() {
            TransactionKind::Income => acc.income += t.amount,
            TransactionKind::Expense => acc.expenses += -t.amount,
        }
        acc.balance += t.amount;
        acc
    })
}

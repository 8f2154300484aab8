use crate::models::category::CategoryViolation;
use crate::models::transaction::TransactionViolation;
use thiserror::Error;

/// Failures raised by the storage layer.
///
/// These are programming-error class failures (duplicate ids, missing rows,
/// broken hierarchy); user input problems are caught by the editors first.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Category with ID {0} already exists")]
    DuplicateId(i64),
    #[error("Category with ID {0} not found")]
    NotFound(i64),
    #[error("Invalid category: {0:?}")]
    InvalidCategory(Vec<CategoryViolation>),
    #[error("Invalid transaction: {0:?}")]
    InvalidTransaction(Vec<TransactionViolation>),
    #[error("No category ID is available after {0}")]
    IdsExhausted(i64),
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

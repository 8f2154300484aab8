use crate::models::currency::is_valid_currency_code;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MEMO_MAX_LENGTH: usize = 200;

/// Smallest representable step of an amount (0.01).
pub const MIN_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Invalid transaction type '{}'. Use 'income' or 'expense'.", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionViolation {
    #[error("amount must be greater than 0")]
    AmountNotPositive,
    #[error("amount must be in increments of 0.01")]
    AmountPrecision,
    #[error("currencyCode is required")]
    CurrencyRequired,
    #[error("currencyCode must be ISO-4217 format (e.g., USD)")]
    CurrencyInvalid,
    #[error("categoryId must be greater than 0")]
    InvalidCategoryId,
    #[error("memo must be 200 characters or less")]
    MemoTooLong,
}

/// A recorded monetary event. Carries no id: the store assigns one on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    pub category_id: i64,
    pub memo: String,
}

impl Transaction {
    pub fn new(
        timestamp: DateTime<Utc>,
        amount: Decimal,
        currency_code: String,
        transaction_type: TransactionType,
        category_id: i64,
        memo: String,
    ) -> Self {
        Self {
            timestamp,
            amount,
            currency_code,
            transaction_type,
            category_id,
            memo,
        }
    }

    /// Returns every rule the value breaks; empty when well-formed.
    pub fn validate(&self) -> Vec<TransactionViolation> {
        let mut violations = Vec::new();

        if self.amount <= Decimal::ZERO {
            violations.push(TransactionViolation::AmountNotPositive);
        }
        if !is_whole_cents(self.amount) {
            violations.push(TransactionViolation::AmountPrecision);
        }

        if self.currency_code.trim().is_empty() {
            violations.push(TransactionViolation::CurrencyRequired);
        } else if !is_valid_currency_code(&self.currency_code) {
            violations.push(TransactionViolation::CurrencyInvalid);
        }

        if self.category_id <= 0 {
            violations.push(TransactionViolation::InvalidCategoryId);
        }

        if self.memo.chars().count() > MEMO_MAX_LENGTH {
            violations.push(TransactionViolation::MemoTooLong);
        }

        violations
    }
}

pub fn is_whole_cents(amount: Decimal) -> bool {
    (amount % MIN_UNIT).is_zero()
}

/// A transaction paired with the id the store gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    pub id: i64,
    pub transaction: Transaction,
}

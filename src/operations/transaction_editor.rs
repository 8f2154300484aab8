use crate::db::category_repository::CategoryRepository;
use crate::db::error::StoreResult;
use crate::db::settings_repository::SettingsRepository;
use crate::db::transaction_repository::TransactionRepository;
use crate::models::category::Category;
use crate::models::currency::is_valid_currency_code;
use crate::models::transaction::{MEMO_MAX_LENGTH, Transaction, TransactionType, is_whole_cents};
use crate::operations::EditorMode;
use chrono::{DateTime, Local, Utc};
use log::{info, warn};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEditorError {
    AmountRequired,
    AmountInvalid,
    CurrencyRequired,
    CurrencyInvalid,
    CategoryRequired,
    MemoTooLong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEditorState {
    /// Id of the stored row being edited, if any.
    pub transaction_id: Option<i64>,
    pub amount_input: String,
    pub currency_input: String,
    pub memo_input: String,
    pub transaction_type: TransactionType,
    pub categories: Vec<Category>,
    pub selected_category_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub formatted_timestamp: String,
    pub validation_errors: Vec<TransactionEditorError>,
    pub storage_error: Option<String>,
}

impl Default for TransactionEditorState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            transaction_id: None,
            amount_input: String::new(),
            currency_input: String::new(),
            memo_input: String::new(),
            transaction_type: TransactionType::Expense,
            categories: Vec::new(),
            selected_category_id: None,
            timestamp: now,
            formatted_timestamp: format_timestamp(now),
            validation_errors: Vec::new(),
            storage_error: None,
        }
    }
}

impl TransactionEditorState {
    pub fn mode(&self) -> EditorMode {
        match self.transaction_id {
            Some(_) => EditorMode::Edit,
            None => EditorMode::Create,
        }
    }

    /// Runs every check; errors accumulate rather than short-circuit.
    pub fn validate(&self) -> Vec<TransactionEditorError> {
        let mut errors = Vec::new();

        let amount_text = self.amount_input.trim();
        if amount_text.is_empty() {
            errors.push(TransactionEditorError::AmountRequired);
        } else if parse_amount(amount_text).is_none() {
            errors.push(TransactionEditorError::AmountInvalid);
        }

        let currency = self.currency_input.trim();
        if currency.is_empty() {
            errors.push(TransactionEditorError::CurrencyRequired);
        } else if !is_valid_currency_code(&currency.to_uppercase()) {
            errors.push(TransactionEditorError::CurrencyInvalid);
        }

        if self.selected_category_id.is_none() {
            errors.push(TransactionEditorError::CategoryRequired);
        }

        if self.memo_input.chars().count() > MEMO_MAX_LENGTH {
            errors.push(TransactionEditorError::MemoTooLong);
        }

        errors
    }

    /// The value to persist, or `None` while the inputs are invalid.
    pub fn build_transaction(&self) -> Option<Transaction> {
        if !self.validate().is_empty() {
            return None;
        }
        Some(Transaction {
            timestamp: self.timestamp,
            amount: parse_amount(self.amount_input.trim())?,
            currency_code: self.currency_input.trim().to_uppercase(),
            transaction_type: self.transaction_type,
            category_id: self.selected_category_id?,
            memo: self.memo_input.trim().to_string(),
        })
    }
}

/// Positive amount with at most cent precision. Digit separators and inputs
/// that cannot be held without rounding are rejected.
fn parse_amount(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        return None;
    }
    Decimal::from_str_exact(text)
        .ok()
        .filter(|amount| *amount > Decimal::ZERO && is_whole_cents(*amount))
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y/%m/%d %H:%M")
        .to_string()
}

/// Amount as shown in the editor: `1280.00` becomes `1280`.
pub fn display_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEditorAction {
    ChangeAmount(String),
    ChangeCurrency(String),
    ChangeMemo(String),
    ChangeType(TransactionType),
    SelectCategory(i64),
}

pub fn reduce(state: TransactionEditorState, action: TransactionEditorAction) -> TransactionEditorState {
    match action {
        TransactionEditorAction::ChangeAmount(amount_input) => TransactionEditorState {
            amount_input,
            ..state
        },
        TransactionEditorAction::ChangeCurrency(currency) => TransactionEditorState {
            currency_input: currency.to_uppercase(),
            ..state
        },
        TransactionEditorAction::ChangeMemo(memo_input) => TransactionEditorState { memo_input, ..state },
        TransactionEditorAction::ChangeType(transaction_type) => TransactionEditorState {
            transaction_type,
            ..state
        },
        TransactionEditorAction::SelectCategory(category_id) => TransactionEditorState {
            selected_category_id: Some(category_id),
            ..state
        },
    }
}

/// Load, edit and save workflow for a single transaction.
pub struct TransactionEditor<'a> {
    transactions: &'a dyn TransactionRepository,
    state: TransactionEditorState,
}

impl<'a> TransactionEditor<'a> {
    /// Binds to `transaction_id` when it exists, otherwise starts a new
    /// expense stamped now, in the configured default currency.
    pub fn load(
        categories: &dyn CategoryRepository,
        transactions: &'a dyn TransactionRepository,
        settings: &dyn SettingsRepository,
        transaction_id: Option<i64>,
    ) -> StoreResult<Self> {
        let active = categories.get_active()?;
        let stored = match transaction_id {
            Some(id) => transactions.get_by_id(id)?,
            None => None,
        };
        if transaction_id.is_some() && stored.is_none() {
            warn!("Transaction {:?} not found, starting a new transaction instead", transaction_id);
        }

        let state = match stored {
            Some(stored) => {
                let tx = stored.transaction;
                TransactionEditorState {
                    transaction_id: Some(stored.id),
                    amount_input: display_amount(tx.amount),
                    currency_input: tx.currency_code,
                    memo_input: tx.memo,
                    transaction_type: tx.transaction_type,
                    categories: active,
                    selected_category_id: Some(tx.category_id),
                    timestamp: tx.timestamp,
                    formatted_timestamp: format_timestamp(tx.timestamp),
                    ..TransactionEditorState::default()
                }
            }
            None => TransactionEditorState {
                currency_input: settings.default_currency_code()?,
                selected_category_id: active.first().map(|c| c.id),
                categories: active,
                ..TransactionEditorState::default()
            },
        };
        Ok(Self { transactions, state })
    }

    pub fn state(&self) -> &TransactionEditorState {
        &self.state
    }

    pub fn dispatch(&mut self, action: TransactionEditorAction) -> &TransactionEditorState {
        self.state = reduce(std::mem::take(&mut self.state), action);
        &self.state
    }

    pub fn change_amount(&mut self, amount: &str) -> &TransactionEditorState {
        self.dispatch(TransactionEditorAction::ChangeAmount(amount.to_string()))
    }

    pub fn change_currency(&mut self, currency: &str) -> &TransactionEditorState {
        self.dispatch(TransactionEditorAction::ChangeCurrency(currency.to_string()))
    }

    pub fn change_memo(&mut self, memo: &str) -> &TransactionEditorState {
        self.dispatch(TransactionEditorAction::ChangeMemo(memo.to_string()))
    }

    pub fn change_type(&mut self, transaction_type: TransactionType) -> &TransactionEditorState {
        self.dispatch(TransactionEditorAction::ChangeType(transaction_type))
    }

    pub fn change_category(&mut self, category_id: i64) -> &TransactionEditorState {
        self.dispatch(TransactionEditorAction::SelectCategory(category_id))
    }

    pub fn validate(&self) -> Vec<TransactionEditorError> {
        self.state.validate()
    }

    /// Validates and persists. Editing replaces the stored row, so the saved
    /// transaction gets a new id; the editor is rebound to it.
    pub fn save(&mut self) -> bool {
        let errors = self.validate();
        if !errors.is_empty() {
            self.state.validation_errors = errors;
            return false;
        }
        self.state.validation_errors.clear();

        let Some(transaction) = self.state.build_transaction() else {
            return false;
        };
        let result = match self.state.transaction_id {
            Some(old_id) => self.transactions.replace(old_id, &transaction),
            None => self.transactions.insert(&transaction),
        };

        match result {
            Ok(new_id) => {
                info!("Saved transaction {}", new_id);
                self.state.transaction_id = Some(new_id);
                self.state.storage_error = None;
                true
            }
            Err(e) => {
                warn!("Failed to save transaction: {}", e);
                self.state.storage_error = Some(e.to_string());
                false
            }
        }
    }
}

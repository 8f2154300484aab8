use crate::db::error::{StoreError, StoreResult};
use crate::models::transaction::{StoredTransaction, Transaction};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;

pub trait TransactionRepository {
    fn get_by_id(&self, id: i64) -> StoreResult<Option<StoredTransaction>>;

    fn get_all(&self) -> StoreResult<Vec<StoredTransaction>>;

    fn get_by_category(&self, category_id: i64) -> StoreResult<Vec<StoredTransaction>>;

    /// Stores a new row and returns the id the store assigned to it.
    fn insert(&self, transaction: &Transaction) -> StoreResult<i64>;

    /// Deletes `id` and inserts `transaction` as one unit. The result has a new id.
    fn replace(&self, id: i64, transaction: &Transaction) -> StoreResult<i64>;

    /// Removes the row if present. Missing ids are not an error.
    fn delete_by_id(&self, id: i64) -> StoreResult<()>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, amount, currency_code, type, category_id, memo FROM transactions";

pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<Vec<StoredTransaction>> {
        let mut stmt = self.conn.prepare(sql)?;
        let transaction_iter = stmt.query_map(params, map_stored_transaction)?;

        let mut transactions = Vec::new();
        for transaction in transaction_iter {
            transactions.push(transaction?);
        }
        Ok(transactions)
    }
}

fn map_stored_transaction(row: &Row) -> rusqlite::Result<StoredTransaction> {
    let timestamp_str: String = row.get(1)?;
    let amount_str: String = row.get(2)?;
    let type_str: String = row.get(4)?;

    Ok(StoredTransaction {
        id: row.get(0)?,
        transaction: Transaction {
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?
                .with_timezone(&Utc),
            amount: Decimal::from_str(&amount_str)
                .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
            currency_code: row.get(3)?,
            transaction_type: type_str
                .parse()
                .map_err(rusqlite::Error::InvalidParameterName)?,
            category_id: row.get(5)?,
            memo: row.get(6)?,
        },
    })
}

fn insert_row(conn: &Connection, transaction: &Transaction) -> StoreResult<i64> {
    let violations = transaction.validate();
    if !violations.is_empty() {
        return Err(StoreError::InvalidTransaction(violations));
    }

    conn.execute(
        "INSERT INTO transactions (timestamp, amount, currency_code, type, category_id, memo) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            transaction
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            transaction.amount.to_string(),
            transaction.currency_code,
            transaction.transaction_type.as_str(),
            transaction.category_id,
            transaction.memo,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn get_by_id(&self, id: i64) -> StoreResult<Option<StoredTransaction>> {
        let transaction = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                map_stored_transaction,
            )
            .optional()?;
        Ok(transaction)
    }

    fn get_all(&self) -> StoreResult<Vec<StoredTransaction>> {
        self.query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS), [])
    }

    fn get_by_category(&self, category_id: i64) -> StoreResult<Vec<StoredTransaction>> {
        self.query(
            &format!("{} WHERE category_id = ?1 ORDER BY id ASC", SELECT_COLUMNS),
            [category_id],
        )
    }

    fn insert(&self, transaction: &Transaction) -> StoreResult<i64> {
        let id = insert_row(self.conn, transaction)?;
        debug!("Inserted transaction {}", id);
        Ok(id)
    }

    fn replace(&self, id: i64, transaction: &Transaction) -> StoreResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        let new_id = insert_row(&tx, transaction)?;
        tx.commit()?;
        debug!("Replaced transaction {} with {}", id, new_id);
        Ok(new_id)
    }

    fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        debug!("Deleted transaction {} (rows: {})", id, rows);
        Ok(())
    }
}

use crate::db::error::StoreResult;
use crate::models::currency::DEFAULT_CURRENCY_CODE;
use log::debug;
use rusqlite::{Connection, OptionalExtension};

const KEY_DEFAULT_CURRENCY_CODE: &str = "default_currency_code";

pub trait SettingsRepository {
    /// Upper-cased stored code, or `JPY` when nothing has been saved.
    fn default_currency_code(&self) -> StoreResult<String>;

    fn set_default_currency_code(&self, currency_code: &str) -> StoreResult<()>;
}

/// Preferences kept in their own database, independent of the ledger.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn default_currency_code(&self) -> StoreResult<String> {
        Ok(self
            .get(KEY_DEFAULT_CURRENCY_CODE)?
            .map(|code| code.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string()))
    }

    fn set_default_currency_code(&self, currency_code: &str) -> StoreResult<()> {
        let code = currency_code.to_uppercase();
        self.set(KEY_DEFAULT_CURRENCY_CODE, &code)?;
        debug!("Default currency set to {}", code);
        Ok(())
    }
}

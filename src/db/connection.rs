use rusqlite::{Connection, Result};
use std::path::Path;

const LEDGER_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
        is_preset INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        parent_id INTEGER
    );
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency_code TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
        category_id INTEGER NOT NULL,
        memo TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions (category_id);
";

const SETTINGS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Opens (creating if needed) the database holding categories and transactions.
pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(LEDGER_SCHEMA)?;
    Ok(conn)
}

/// Opens the key-value preferences database, kept apart from the ledger.
pub fn establish_settings_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SETTINGS_SCHEMA)?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(LEDGER_SCHEMA)?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_settings_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SETTINGS_SCHEMA)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_schema_creation_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        establish_connection(&path).unwrap();
        let conn = establish_connection(&path).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('categories', 'transactions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_type_column_rejects_unknown_values() {
        let conn = establish_test_connection().unwrap();
        let result = conn.execute(
            "INSERT INTO categories (id, name, type) VALUES (1, 'Food', 'transfer')",
            [],
        );
        assert!(result.is_err());
    }
}

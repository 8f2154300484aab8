use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "madhatter", about = "Personal income and expense tracker")]
pub struct AppConfig {
    /// Ledger database holding categories and transactions.
    #[arg(long = "db", env = "MADHATTER_DB", default_value = "madhatter.db")]
    pub db_path: PathBuf,

    /// Preferences database, kept separate from the ledger.
    #[arg(long = "settings-db", env = "MADHATTER_SETTINGS_DB", default_value = "madhatter_settings.db")]
    pub settings_path: PathBuf,
}

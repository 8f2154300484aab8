use clap::Parser;
use log::{error, info};
use madhatter::config::AppConfig;
use madhatter::db::category_repository::{CategoryRepository, SqliteCategoryRepository};
use madhatter::db::connection::{establish_connection, establish_settings_connection};
use madhatter::db::presets::seed_preset_categories;
use madhatter::db::settings_repository::SqliteSettingsRepository;
use madhatter::db::transaction_repository::{SqliteTransactionRepository, TransactionRepository};
use madhatter::models::transaction::TransactionType;
use madhatter::operations::category_editor::CategoryEditor;
use madhatter::operations::dashboard::load_dashboard;
use madhatter::operations::settings::SettingsEditor;
use madhatter::operations::transaction_editor::{TransactionEditor, display_amount, format_timestamp};
use std::error::Error;
use std::io::{self, BufRead};

pub enum UserCommands {
    Summary,
    Categories,
    AddCategory,
    EditCategory(i64),
    DeleteCategory(i64),
    Transactions,
    Add,
    Edit(i64),
    Remove(i64),
    Currency(Option<String>),
    Exit,
    Unknown(String),
}

struct Repositories<'conn> {
    categories: SqliteCategoryRepository<'conn>,
    transactions: SqliteTransactionRepository<'conn>,
    settings: SqliteSettingsRepository<'conn>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::parse();

    let ledger = establish_connection(&config.db_path)?;
    let preferences = establish_settings_connection(&config.settings_path)?;
    info!(
        "Opened ledger {} and settings {}",
        config.db_path.display(),
        config.settings_path.display()
    );

    let repos = Repositories {
        categories: SqliteCategoryRepository::new(&ledger),
        transactions: SqliteTransactionRepository::new(&ledger),
        settings: SqliteSettingsRepository::new(&preferences),
    };
    seed_preset_categories(&repos.categories)?;

    println!("Welcome to Mad Hatter!");
    loop {
        println!(
            "Please enter a command (summary, categories, add-category, edit-category <id>, delete-category <id>, transactions, add, edit <id>, remove <id>, currency [CODE], exit):"
        );
        let input = match read_user_input() {
            Ok(Some(cmd)) => cmd,
            Ok(None) => {
                println!("End of input, exiting the application.");
                break;
            }
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        if input.is_empty() {
            continue;
        }

        let command = check_for_command(&input);
        if matches!(command, UserCommands::Exit) {
            println!("Exiting the application.");
            break;
        }
        if let Err(e) = run_command(&repos, command) {
            error!("Command failed: {}", e);
            println!("Error: {}", e);
        }
    }
    Ok(())
}

fn run_command(repos: &Repositories, command: UserCommands) -> Result<(), Box<dyn Error>> {
    match command {
        UserCommands::Summary => print_summary(repos)?,
        UserCommands::Categories => {
            for category in repos.categories.get_all()? {
                println!(
                    "{:>4}  {:<20} {:<8} parent: {:<5} {}{}",
                    category.id,
                    category.name,
                    category.category_type,
                    category.parent_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                    if category.is_active { "active" } else { "inactive" },
                    if category.is_preset { " (preset)" } else { "" },
                );
            }
        }
        UserCommands::AddCategory => edit_category(repos, None)?,
        UserCommands::EditCategory(id) => edit_category(repos, Some(id))?,
        UserCommands::DeleteCategory(id) => {
            let mut editor = CategoryEditor::load(&repos.categories, Some(id))?;
            if editor.delete() {
                println!("Category {} deleted.", id);
            } else {
                println!("Category {} not found.", id);
            }
        }
        UserCommands::Transactions => {
            for stored in load_dashboard(&repos.categories, &repos.transactions)?.recent_transactions {
                let tx = &stored.transaction;
                println!(
                    "{:>4}  {}  {:<8} {:>12} {}  category {}  {}",
                    stored.id,
                    format_timestamp(tx.timestamp),
                    tx.transaction_type,
                    display_amount(tx.amount),
                    tx.currency_code,
                    tx.category_id,
                    tx.memo,
                );
            }
        }
        UserCommands::Add => edit_transaction(repos, None)?,
        UserCommands::Edit(id) => edit_transaction(repos, Some(id))?,
        UserCommands::Remove(id) => {
            repos.transactions.delete_by_id(id)?;
            println!("Transaction {} removed.", id);
        }
        UserCommands::Currency(code) => {
            let mut editor = SettingsEditor::load(&repos.settings)?;
            match code {
                Some(code) => {
                    if editor.select_currency(&code)? {
                        println!("Default currency set to {}.", editor.state().selected_currency_code);
                    } else {
                        println!("Invalid currency code '{}'. Use a 3-letter ISO-4217 code.", code);
                    }
                }
                None => println!(
                    "Default currency: {} (presets: {})",
                    editor.state().selected_currency_code,
                    editor.state().currency_presets.join(", ")
                ),
            }
        }
        UserCommands::Unknown(input) => println!("No valid command found: '{}'.", input),
        UserCommands::Exit => {}
    }
    Ok(())
}

fn print_summary(repos: &Repositories) -> Result<(), Box<dyn Error>> {
    let summary = load_dashboard(&repos.categories, &repos.transactions)?;
    println!("Income:   {} {}", summary.income_total, summary.currency_label);
    println!("Expenses: {} {}", summary.expense_total, summary.currency_label);
    println!("Net:      {} {}", summary.net_total, summary.currency_label);
    println!(
        "{} active categories, {} transactions",
        summary.active_category_count, summary.transaction_count
    );
    if let Some(latest) = summary.latest {
        let tx = latest.transaction;
        let memo = if tx.memo.trim().is_empty() { "no memo".to_string() } else { tx.memo };
        println!(
            "Latest: {} {} {} ({})",
            display_amount(tx.amount),
            tx.currency_code,
            memo,
            format_timestamp(tx.timestamp)
        );
    }
    if !summary.recent_categories.is_empty() {
        println!("Categories: {}", summary.recent_categories.join(", "));
    }
    Ok(())
}

fn edit_category(repos: &Repositories, id: Option<i64>) -> Result<(), Box<dyn Error>> {
    let mut editor = CategoryEditor::load(&repos.categories, id)?;
    let state = editor.state().clone();

    let name = prompt("Name", &state.name_input)?;
    editor.change_name(&name);

    let type_input = prompt("Type (income/expense)", state.category_type.as_str())?;
    match type_input.parse::<TransactionType>() {
        Ok(category_type) => {
            editor.change_type(category_type);
        }
        Err(e) => println!("{} Keeping {}.", e, state.category_type),
    }

    let options: Vec<String> = editor
        .state()
        .parent_options
        .iter()
        .map(|c| format!("{}={}", c.id, c.name))
        .collect();
    println!("Parent options: {}", if options.is_empty() { "none".to_string() } else { options.join(", ") });
    let current_parent = editor
        .state()
        .selected_parent_id
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let parent_input = prompt("Parent id (- for none)", &current_parent)?;
    if parent_input == "-" {
        editor.select_parent(None);
    } else {
        match parent_input.parse::<i64>() {
            Ok(parent_id) => {
                editor.select_parent(Some(parent_id));
            }
            Err(_) => println!("Invalid parent id '{}'. Keeping {}.", parent_input, current_parent),
        }
    }

    let active_input = prompt("Active (yes/no)", if state.is_active { "yes" } else { "no" })?;
    editor.change_active(!active_input.eq_ignore_ascii_case("no"));

    if editor.save() {
        println!("Category saved with ID {}.", editor.state().category_id.unwrap_or_default());
    } else {
        report_failure(&editor.state().validation_errors, editor.state().storage_error.as_deref());
    }
    Ok(())
}

fn edit_transaction(repos: &Repositories, id: Option<i64>) -> Result<(), Box<dyn Error>> {
    let mut editor = TransactionEditor::load(&repos.categories, &repos.transactions, &repos.settings, id)?;
    let state = editor.state().clone();
    println!("Date: {}", state.formatted_timestamp);

    let amount = prompt("Amount", &state.amount_input)?;
    editor.change_amount(&amount);

    let currency = prompt("Currency", &state.currency_input)?;
    editor.change_currency(&currency);

    let type_input = prompt("Type (income/expense)", state.transaction_type.as_str())?;
    match type_input.parse::<TransactionType>() {
        Ok(transaction_type) => {
            editor.change_type(transaction_type);
        }
        Err(e) => println!("{} Keeping {}.", e, state.transaction_type),
    }

    let options: Vec<String> = state
        .categories
        .iter()
        .map(|c| format!("{}={}", c.id, c.name))
        .collect();
    println!("Categories: {}", options.join(", "));
    let current_category = state
        .selected_category_id
        .map(|c| c.to_string())
        .unwrap_or_default();
    let category_input = prompt("Category id", &current_category)?;
    match category_input.parse::<i64>() {
        Ok(category_id) => {
            editor.change_category(category_id);
        }
        Err(_) => println!("Invalid category id '{}'. Keeping {}.", category_input, current_category),
    }

    let memo = prompt("Memo", &state.memo_input)?;
    editor.change_memo(&memo);

    if editor.save() {
        println!("Transaction saved with ID {}.", editor.state().transaction_id.unwrap_or_default());
    } else {
        report_failure(&editor.state().validation_errors, editor.state().storage_error.as_deref());
    }
    Ok(())
}

fn report_failure<E: std::fmt::Debug>(validation_errors: &[E], storage_error: Option<&str>) {
    if !validation_errors.is_empty() {
        println!("Not saved: {:?}", validation_errors);
    }
    if let Some(e) = storage_error {
        println!("Not saved: {}", e);
    }
}

/// Reads one field; an empty answer keeps `current`.
fn prompt(label: &str, current: &str) -> Result<String, String> {
    println!("{} [{}]:", label, current);
    let input = read_user_input()?.ok_or_else(|| "Input ended before the form was complete".to_string())?;
    if input.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(input)
    }
}

fn read_user_input() -> Result<Option<String>, String> {
    read_line_from(&mut io::stdin().lock())
}

/// One trimmed line, or `None` once the reader is exhausted.
fn read_line_from(reader: &mut impl BufRead) -> Result<Option<String>, String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn check_for_command(input: &str) -> UserCommands {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let id = parts.get(1).and_then(|s| s.parse::<i64>().ok());
    match (parts[0], id) {
        ("summary", _) => UserCommands::Summary,
        ("categories", _) => UserCommands::Categories,
        ("add-category", _) => UserCommands::AddCategory,
        ("edit-category", Some(id)) => UserCommands::EditCategory(id),
        ("delete-category", Some(id)) => UserCommands::DeleteCategory(id),
        ("transactions", _) => UserCommands::Transactions,
        ("add", _) => UserCommands::Add,
        ("edit", Some(id)) => UserCommands::Edit(id),
        ("remove", Some(id)) => UserCommands::Remove(id),
        ("currency", _) => UserCommands::Currency(parts.get(1).map(|s| s.to_string())),
        ("exit", _) => UserCommands::Exit,
        _ => UserCommands::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_from_trims_and_detects_end() {
        let mut reader = Cursor::new("  summary \n\n");

        assert_eq!(read_line_from(&mut reader).unwrap(), Some("summary".to_string()));
        assert_eq!(read_line_from(&mut reader).unwrap(), Some(String::new()));
        assert_eq!(read_line_from(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_read_line_from_empty_input() {
        let mut reader = Cursor::new("");

        assert_eq!(read_line_from(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_check_for_command() {
        assert!(matches!(check_for_command("edit 7"), UserCommands::Edit(7)));
        assert!(matches!(check_for_command("edit seven"), UserCommands::Unknown(_)));
        assert!(matches!(check_for_command("exit"), UserCommands::Exit));
    }
}

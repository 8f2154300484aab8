use crate::db::category_repository::CategoryRepository;
use crate::db::error::StoreResult;
use crate::db::transaction_repository::TransactionRepository;
use crate::models::transaction::{StoredTransaction, TransactionType};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub const MULTI_CURRENCY_LABEL: &str = "MULTI";
pub const NO_CURRENCY_LABEL: &str = "-";
const RECENT_CATEGORY_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net_total: Decimal,
    pub currency_label: String,
    pub active_category_count: usize,
    pub transaction_count: usize,
    pub latest: Option<StoredTransaction>,
    pub recent_categories: Vec<String>,
    /// Newest first.
    pub recent_transactions: Vec<StoredTransaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net_total: Decimal,
    pub currency_label: String,
}

/// Sums amounts by type. Currencies are not converted: mixed codes are added as-is.
pub fn aggregate(transactions: &[StoredTransaction]) -> Totals {
    let mut income_total = Decimal::ZERO;
    let mut expense_total = Decimal::ZERO;
    let mut currencies = BTreeSet::new();

    for stored in transactions {
        let tx = &stored.transaction;
        match tx.transaction_type {
            TransactionType::Income => income_total += tx.amount,
            TransactionType::Expense => expense_total += tx.amount,
        }
        currencies.insert(tx.currency_code.as_str());
    }

    let currency_label = match currencies.len() {
        0 => NO_CURRENCY_LABEL.to_string(),
        1 => currencies.iter().next().map(|c| c.to_string()).unwrap_or_default(),
        _ => MULTI_CURRENCY_LABEL.to_string(),
    };

    Totals {
        income_total,
        expense_total,
        net_total: income_total - expense_total,
        currency_label,
    }
}

/// Orders by timestamp descending, newer ids first on ties.
pub fn sort_newest_first(transactions: &mut [StoredTransaction]) {
    transactions.sort_by(|a, b| {
        b.transaction
            .timestamp
            .cmp(&a.transaction.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}

pub fn load_dashboard(
    categories: &dyn CategoryRepository,
    transactions: &dyn TransactionRepository,
) -> StoreResult<DashboardSummary> {
    let active = categories.get_active()?;
    let mut all = transactions.get_all()?;
    sort_newest_first(&mut all);

    let totals = aggregate(&all);
    Ok(DashboardSummary {
        income_total: totals.income_total,
        expense_total: totals.expense_total,
        net_total: totals.net_total,
        currency_label: totals.currency_label,
        active_category_count: active.len(),
        transaction_count: all.len(),
        latest: all.first().cloned(),
        recent_categories: active
            .iter()
            .take(RECENT_CATEGORY_COUNT)
            .map(|c| c.name.clone())
            .collect(),
        recent_transactions: all,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::SqliteCategoryRepository;
    use crate::db::connection::establish_test_connection;
    use crate::db::transaction_repository::SqliteTransactionRepository;
    use crate::models::category::Category;
    use crate::models::transaction::Transaction;
    use chrono::{TimeZone, Utc};

    fn stored(id: i64, transaction_type: TransactionType, amount: i64, currency: &str, hour: u32) -> StoredTransaction {
        StoredTransaction {
            id,
            transaction: Transaction::new(
                Utc.with_ymd_and_hms(2024, 4, 8, hour, 0, 0).unwrap(),
                Decimal::from(amount),
                currency.to_string(),
                transaction_type,
                1,
                String::new(),
            ),
        }
    }

    #[test]
    fn test_totals() {
        let transactions = vec![
            stored(1, TransactionType::Income, 1000, "JPY", 1),
            stored(2, TransactionType::Expense, 300, "JPY", 2),
            stored(3, TransactionType::Expense, 200, "JPY", 3),
        ];

        let totals = aggregate(&transactions);

        assert_eq!(totals.income_total, Decimal::from(1000));
        assert_eq!(totals.expense_total, Decimal::from(500));
        assert_eq!(totals.net_total, Decimal::from(500));
        assert_eq!(totals.currency_label, "JPY");
    }

    #[test]
    fn test_empty_totals() {
        let totals = aggregate(&[]);

        assert_eq!(totals.net_total, Decimal::ZERO);
        assert_eq!(totals.currency_label, NO_CURRENCY_LABEL);
    }

    #[test]
    fn test_mixed_currencies_are_summed_without_conversion() {
        let transactions = vec![
            stored(1, TransactionType::Expense, 100, "JPY", 1),
            stored(2, TransactionType::Expense, 5, "USD", 2),
        ];

        let totals = aggregate(&transactions);

        assert_eq!(totals.expense_total, Decimal::from(105));
        assert_eq!(totals.currency_label, MULTI_CURRENCY_LABEL);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut transactions = vec![
            stored(1, TransactionType::Expense, 1, "JPY", 1),
            stored(2, TransactionType::Expense, 1, "JPY", 5),
            stored(3, TransactionType::Expense, 1, "JPY", 5),
            stored(4, TransactionType::Expense, 1, "JPY", 3),
        ];

        sort_newest_first(&mut transactions);

        let ids: Vec<i64> = transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_load_dashboard() {
        let conn = establish_test_connection().unwrap();
        let categories = SqliteCategoryRepository::new(&conn);
        let transactions = SqliteTransactionRepository::new(&conn);
        for (id, name) in [(1, "Food"), (2, "Transport"), (3, "Housing"), (4, "Health")] {
            categories.insert(&Category::new(id, name, TransactionType::Expense)).unwrap();
        }
        categories
            .insert(&Category {
                is_active: false,
                ..Category::new(5, "Old", TransactionType::Expense)
            })
            .unwrap();
        transactions.insert(&stored(0, TransactionType::Income, 1000, "JPY", 1).transaction).unwrap();
        let latest_id = transactions
            .insert(&stored(0, TransactionType::Expense, 300, "JPY", 9).transaction)
            .unwrap();
        transactions.insert(&stored(0, TransactionType::Expense, 200, "JPY", 4).transaction).unwrap();

        let summary = load_dashboard(&categories, &transactions).unwrap();

        assert_eq!(summary.active_category_count, 4);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.net_total, Decimal::from(500));
        assert_eq!(summary.latest.map(|t| t.id), Some(latest_id));
        assert_eq!(summary.recent_categories, vec!["Food", "Transport", "Housing"]);
        assert_eq!(summary.recent_transactions[0].id, latest_id);
    }

    #[test]
    fn test_load_dashboard_empty() {
        let conn = establish_test_connection().unwrap();
        let categories = SqliteCategoryRepository::new(&conn);
        let transactions = SqliteTransactionRepository::new(&conn);

        let summary = load_dashboard(&categories, &transactions).unwrap();

        assert_eq!(summary.transaction_count, 0);
        assert!(summary.latest.is_none());
        assert_eq!(summary.currency_label, NO_CURRENCY_LABEL);
    }
}

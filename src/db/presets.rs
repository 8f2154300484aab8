use crate::db::category_repository::CategoryRepository;
use crate::db::error::StoreResult;
use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use log::info;

const PRESETS: [(&str, TransactionType); 9] = [
    ("Food", TransactionType::Expense),
    ("Transport", TransactionType::Expense),
    ("Housing", TransactionType::Expense),
    ("Utilities", TransactionType::Expense),
    ("Entertainment", TransactionType::Expense),
    ("Health", TransactionType::Expense),
    ("Salary", TransactionType::Income),
    ("Bonus", TransactionType::Income),
    ("Other Income", TransactionType::Income),
];

/// Seeds the preset categories on first launch. Returns how many were inserted.
pub fn seed_preset_categories(repo: &dyn CategoryRepository) -> StoreResult<usize> {
    if !repo.get_all()?.is_empty() {
        return Ok(0);
    }

    for (index, (name, category_type)) in PRESETS.iter().enumerate() {
        let category = Category {
            is_preset: true,
            ..Category::new(index as i64 + 1, name, *category_type)
        };
        repo.insert(&category)?;
    }
    info!("Seeded {} preset categories", PRESETS.len());
    Ok(PRESETS.len())
}

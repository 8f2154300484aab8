use crate::models::transaction::TransactionType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryViolation {
    #[error("id must be greater than 0")]
    InvalidId,
    #[error("name is required")]
    NameRequired,
    #[error("parentId must be greater than 0")]
    InvalidParentId,
}

/// A node in the two-level category tree (category -> subcategory).
///
/// Preset categories are flagged with `is_preset` so a front end can show a
/// localized label instead of the stored `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: TransactionType,
    pub is_preset: bool,
    pub is_active: bool,
    pub parent_id: Option<i64>,
}

impl Category {
    /// Active, top-level, user-created category.
    pub fn new(id: i64, name: &str, category_type: TransactionType) -> Self {
        Self {
            id,
            name: name.to_string(),
            category_type,
            is_preset: false,
            is_active: true,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn validate(&self) -> Vec<CategoryViolation> {
        let mut violations = Vec::new();

        if self.id <= 0 {
            violations.push(CategoryViolation::InvalidId);
        }
        if self.name.trim().is_empty() {
            violations.push(CategoryViolation::NameRequired);
        }
        if matches!(self.parent_id, Some(parent_id) if parent_id <= 0) {
            violations.push(CategoryViolation::InvalidParentId);
        }

        violations
    }
}

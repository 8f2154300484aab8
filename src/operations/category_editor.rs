use crate::db::category_repository::CategoryRepository;
use crate::db::error::{StoreError, StoreResult};
use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use crate::operations::EditorMode;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryEditorError {
    NameRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEditorState {
    /// Set when editing a stored category.
    pub category_id: Option<i64>,
    pub name_input: String,
    pub category_type: TransactionType,
    pub is_preset: bool,
    pub is_active: bool,
    pub all_categories: Vec<Category>,
    pub parent_options: Vec<Category>,
    pub selected_parent_id: Option<i64>,
    pub validation_errors: Vec<CategoryEditorError>,
    pub storage_error: Option<String>,
}

impl Default for CategoryEditorState {
    fn default() -> Self {
        Self {
            category_id: None,
            name_input: String::new(),
            category_type: TransactionType::Expense,
            is_preset: false,
            is_active: true,
            all_categories: Vec::new(),
            parent_options: Vec::new(),
            selected_parent_id: None,
            validation_errors: Vec::new(),
            storage_error: None,
        }
    }
}

impl CategoryEditorState {
    pub fn mode(&self) -> EditorMode {
        match self.category_id {
            Some(_) => EditorMode::Edit,
            None => EditorMode::Create,
        }
    }

    pub fn validate(&self) -> Vec<CategoryEditorError> {
        let mut errors = Vec::new();
        if self.name_input.trim().is_empty() {
            errors.push(CategoryEditorError::NameRequired);
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEditorAction {
    ChangeName(String),
    ChangeType(TransactionType),
    SelectParent(Option<i64>),
    ChangeActive(bool),
}

/// Categories that may parent a category of `category_type`: same type,
/// top-level only, never the category itself.
pub fn parent_options(
    category_type: TransactionType,
    categories: &[Category],
    current_id: Option<i64>,
) -> Vec<Category> {
    categories
        .iter()
        .filter(|c| {
            c.category_type == category_type && c.is_top_level() && Some(c.id) != current_id
        })
        .cloned()
        .collect()
}

pub fn reduce(state: CategoryEditorState, action: CategoryEditorAction) -> CategoryEditorState {
    match action {
        CategoryEditorAction::ChangeName(name) => CategoryEditorState {
            name_input: name,
            ..state
        },
        CategoryEditorAction::ChangeType(category_type) => {
            let options = parent_options(category_type, &state.all_categories, state.category_id);
            let selected_parent_id = state
                .selected_parent_id
                .filter(|id| options.iter().any(|c| c.id == *id));
            CategoryEditorState {
                category_type,
                parent_options: options,
                selected_parent_id,
                ..state
            }
        }
        CategoryEditorAction::SelectParent(parent_id) => CategoryEditorState {
            selected_parent_id: parent_id,
            ..state
        },
        CategoryEditorAction::ChangeActive(is_active) => CategoryEditorState { is_active, ..state },
    }
}

fn next_category_id(categories: &[Category]) -> StoreResult<i64> {
    let max = categories.iter().map(|c| c.id).max().unwrap_or(0);
    max.checked_add(1).ok_or(StoreError::IdsExhausted(max))
}

/// Load, edit, save and delete workflow for a single category.
pub struct CategoryEditor<'a> {
    repo: &'a dyn CategoryRepository,
    state: CategoryEditorState,
}

impl<'a> CategoryEditor<'a> {
    /// Binds to `category_id` when it exists, otherwise starts a new category.
    pub fn load(repo: &'a dyn CategoryRepository, category_id: Option<i64>) -> StoreResult<Self> {
        let categories = repo.get_all()?;
        let stored = match category_id {
            Some(id) => repo.get_by_id(id)?,
            None => None,
        };
        if category_id.is_some() && stored.is_none() {
            warn!("Category {:?} not found, starting a new category instead", category_id);
        }

        let category_type = stored
            .as_ref()
            .map(|c| c.category_type)
            .unwrap_or(TransactionType::Expense);
        let current_id = stored.as_ref().map(|c| c.id);
        let state = CategoryEditorState {
            category_id: current_id,
            name_input: stored.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            category_type,
            is_preset: stored.as_ref().is_some_and(|c| c.is_preset),
            is_active: stored.as_ref().is_none_or(|c| c.is_active),
            parent_options: parent_options(category_type, &categories, current_id),
            selected_parent_id: stored.as_ref().and_then(|c| c.parent_id),
            all_categories: categories,
            ..CategoryEditorState::default()
        };
        Ok(Self { repo, state })
    }

    pub fn state(&self) -> &CategoryEditorState {
        &self.state
    }

    pub fn dispatch(&mut self, action: CategoryEditorAction) -> &CategoryEditorState {
        self.state = reduce(std::mem::take(&mut self.state), action);
        &self.state
    }

    pub fn change_name(&mut self, name: &str) -> &CategoryEditorState {
        self.dispatch(CategoryEditorAction::ChangeName(name.to_string()))
    }

    pub fn change_type(&mut self, category_type: TransactionType) -> &CategoryEditorState {
        self.dispatch(CategoryEditorAction::ChangeType(category_type))
    }

    pub fn select_parent(&mut self, parent_id: Option<i64>) -> &CategoryEditorState {
        self.dispatch(CategoryEditorAction::SelectParent(parent_id))
    }

    pub fn change_active(&mut self, is_active: bool) -> &CategoryEditorState {
        self.dispatch(CategoryEditorAction::ChangeActive(is_active))
    }

    pub fn validate(&self) -> Vec<CategoryEditorError> {
        self.state.validate()
    }

    /// Validates and persists. On success the editor is bound to the saved id.
    pub fn save(&mut self) -> bool {
        let errors = self.validate();
        if !errors.is_empty() {
            self.state.validation_errors = errors;
            return false;
        }
        self.state.validation_errors.clear();

        match self.persist() {
            Ok(category) => {
                info!("Saved category {} ({})", category.id, category.name);
                self.state.category_id = Some(category.id);
                self.state.storage_error = None;
                true
            }
            Err(e) => {
                warn!("Failed to save category: {}", e);
                self.state.storage_error = Some(e.to_string());
                false
            }
        }
    }

    fn persist(&mut self) -> StoreResult<Category> {
        let id = match self.state.category_id {
            Some(id) => id,
            None => next_category_id(&self.repo.get_all()?)?,
        };
        let category = Category {
            id,
            name: self.state.name_input.trim().to_string(),
            category_type: self.state.category_type,
            is_preset: self.state.is_preset,
            is_active: self.state.is_active,
            parent_id: self.state.selected_parent_id,
        };

        match self.state.mode() {
            EditorMode::Edit => self.repo.update(&category)?,
            EditorMode::Create => self.repo.insert(&category)?,
        }
        self.state.all_categories = self.repo.get_all()?;
        Ok(category)
    }

    /// Deletes the bound category. Returns false when there is nothing to delete.
    /// A successful delete unbinds the editor, so a later save creates a new category.
    pub fn delete(&mut self) -> bool {
        let Some(id) = self.state.category_id else {
            return false;
        };
        match self.repo.delete_by_id(id) {
            Ok(()) => {
                info!("Deleted category {}", id);
                self.state.category_id = None;
                self.state.is_preset = false;
                self.state.storage_error = None;
                true
            }
            Err(e) => {
                warn!("Failed to delete category {}: {}", id, e);
                self.state.storage_error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::SqliteCategoryRepository;
    use crate::db::connection::establish_test_connection;
    use rusqlite::Connection;

    fn seeded_connection() -> Connection {
        let conn = establish_test_connection().unwrap();
        let repo = SqliteCategoryRepository::new(&conn);
        repo.insert(&Category::new(1, "Food", TransactionType::Expense)).unwrap();
        repo.insert(&Category::new(2, "Cafe", TransactionType::Expense).with_parent(1)).unwrap();
        repo.insert(&Category::new(3, "Salary", TransactionType::Income)).unwrap();
        repo.insert(&Category::new(4, "Transport", TransactionType::Expense)).unwrap();
        conn
    }

    fn option_ids(state: &CategoryEditorState) -> Vec<i64> {
        state.parent_options.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_load_without_id_starts_create() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);

        let editor = CategoryEditor::load(&repo, None).unwrap();

        assert_eq!(editor.state().mode(), EditorMode::Create);
        assert_eq!(editor.state().category_type, TransactionType::Expense);
        assert!(editor.state().is_active);
        assert_eq!(option_ids(editor.state()), vec![1, 4]);
    }

    #[test]
    fn test_load_missing_id_falls_back_to_create() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);

        let editor = CategoryEditor::load(&repo, Some(99)).unwrap();

        assert_eq!(editor.state().mode(), EditorMode::Create);
        assert!(editor.state().name_input.is_empty());
    }

    #[test]
    fn test_load_existing_excludes_self_from_parents() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);

        let editor = CategoryEditor::load(&repo, Some(4)).unwrap();

        assert_eq!(editor.state().mode(), EditorMode::Edit);
        assert_eq!(editor.state().name_input, "Transport");
        assert_eq!(option_ids(editor.state()), vec![1]);
    }

    #[test]
    fn test_load_subcategory_keeps_parent() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);

        let editor = CategoryEditor::load(&repo, Some(2)).unwrap();

        assert_eq!(editor.state().selected_parent_id, Some(1));
    }

    #[test]
    fn test_change_type_clears_invalid_parent() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.select_parent(Some(1));

        let state = editor.change_type(TransactionType::Income);

        assert_eq!(state.selected_parent_id, None);
        assert_eq!(option_ids(state), vec![3]);
    }

    #[test]
    fn test_change_type_keeps_valid_parent() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.select_parent(Some(1));

        let state = editor.change_type(TransactionType::Expense);

        assert_eq!(state.selected_parent_id, Some(1));
    }

    #[test]
    fn test_reduce_is_pure() {
        let before = CategoryEditorState::default();
        let after = reduce(before.clone(), CategoryEditorAction::ChangeName("Hats".to_string()));

        assert_eq!(before.name_input, "");
        assert_eq!(after.name_input, "Hats");
    }

    #[test]
    fn test_save_blank_name_fails() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("   ");

        assert!(!editor.save());
        assert_eq!(editor.state().validation_errors, vec![CategoryEditorError::NameRequired]);
        assert_eq!(repo.get_all().unwrap().len(), 4);
    }

    #[test]
    fn test_save_new_assigns_next_id() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("  Groceries ");
        editor.select_parent(Some(1));

        assert!(editor.save());

        let saved = repo.get_by_id(5).unwrap().unwrap();
        assert_eq!(saved.name, "Groceries");
        assert_eq!(saved.parent_id, Some(1));
        assert!(!saved.is_preset);
        assert_eq!(editor.state().mode(), EditorMode::Edit);
        assert!(editor.state().validation_errors.is_empty());
    }

    #[test]
    fn test_save_first_category_gets_id_one() {
        let conn = establish_test_connection().unwrap();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("Hats");

        assert!(editor.save());
        assert!(repo.get_by_id(1).unwrap().is_some());
    }

    #[test]
    fn test_save_existing_updates_in_place() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, Some(4)).unwrap();
        editor.change_name("Travel");
        editor.change_active(false);

        assert!(editor.save());

        let saved = repo.get_by_id(4).unwrap().unwrap();
        assert_eq!(saved.name, "Travel");
        assert!(!saved.is_active);
        assert_eq!(repo.get_all().unwrap().len(), 4);
    }

    #[test]
    fn test_save_twice_after_create_does_not_duplicate() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("Books");

        assert!(editor.save());
        editor.change_name("Comics");
        assert!(editor.save());

        assert_eq!(repo.get_all().unwrap().len(), 5);
        assert_eq!(repo.get_by_id(5).unwrap().unwrap().name, "Comics");
    }

    #[test]
    fn test_save_reports_hierarchy_violation() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("Espresso");
        editor.select_parent(Some(2));

        assert!(!editor.save());
        assert!(editor.state().storage_error.is_some());
        assert_eq!(repo.get_all().unwrap().len(), 4);
    }

    #[test]
    fn test_delete_in_create_mode_fails() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, None).unwrap();

        assert!(!editor.delete());
    }

    #[test]
    fn test_delete_in_edit_mode() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, Some(4)).unwrap();

        assert!(editor.delete());
        assert_eq!(repo.get_by_id(4).unwrap(), None);
    }

    #[test]
    fn test_delete_unbinds_editor() {
        let conn = seeded_connection();
        let repo = SqliteCategoryRepository::new(&conn);
        let mut editor = CategoryEditor::load(&repo, Some(4)).unwrap();

        assert!(editor.delete());
        assert_eq!(editor.state().mode(), EditorMode::Create);
        assert!(!editor.delete());

        assert!(editor.save());
        assert!(editor.state().storage_error.is_none());
        assert_eq!(repo.get_by_id(4).unwrap().unwrap().name, "Transport");
    }

    #[test]
    fn test_save_reports_exhausted_ids() {
        let conn = establish_test_connection().unwrap();
        let repo = SqliteCategoryRepository::new(&conn);
        repo.insert(&Category::new(i64::MAX, "Big", TransactionType::Expense)).unwrap();
        let mut editor = CategoryEditor::load(&repo, None).unwrap();
        editor.change_name("Next");

        assert!(!editor.save());
        assert!(editor.state().storage_error.is_some());
        assert_eq!(editor.state().mode(), EditorMode::Create);
        assert_eq!(repo.get_all().unwrap().len(), 1);
    }
}

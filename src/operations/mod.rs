pub mod category_editor;
pub mod dashboard;
pub mod settings;
pub mod transaction_editor;

/// Whether an editor is building a new record or bound to a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit,
}

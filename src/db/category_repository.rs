use crate::db::error::{StoreError, StoreResult};
use crate::models::category::Category;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub trait CategoryRepository {
    fn get_by_id(&self, id: i64) -> StoreResult<Option<Category>>;

    /// All categories in insertion (id) order.
    fn get_all(&self) -> StoreResult<Vec<Category>>;

    fn get_active(&self) -> StoreResult<Vec<Category>>;

    /// Direct children of `parent_id`. The tree is two levels deep, so there is no recursion.
    fn get_subcategories(&self, parent_id: i64) -> StoreResult<Vec<Category>>;

    fn insert(&self, category: &Category) -> StoreResult<()>;

    fn update(&self, category: &Category) -> StoreResult<()>;

    /// Removes the row if present. Missing ids are not an error.
    fn delete_by_id(&self, id: i64) -> StoreResult<()>;
}

const SELECT_COLUMNS: &str = "SELECT id, name, type, is_preset, is_active, parent_id FROM categories";

pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(sql)?;
        let category_iter = stmt.query_map(params, map_category)?;

        let mut categories = Vec::new();
        for category in category_iter {
            categories.push(category?);
        }
        Ok(categories)
    }

    /// Keeps the tree two levels deep and single-typed.
    fn check_hierarchy(&self, category: &Category) -> StoreResult<()> {
        let children = self.get_subcategories(category.id)?;
        if children.iter().any(|c| c.category_type != category.category_type) {
            return Err(StoreError::InvalidHierarchy(format!(
                "category {} has subcategories of a different type",
                category.id
            )));
        }

        let Some(parent_id) = category.parent_id else {
            return Ok(());
        };
        if parent_id == category.id {
            return Err(StoreError::InvalidHierarchy(format!(
                "category {} cannot be its own parent",
                category.id
            )));
        }
        if !children.is_empty() {
            return Err(StoreError::InvalidHierarchy(format!(
                "category {} has subcategories and cannot be nested",
                category.id
            )));
        }

        let parent = self.get_by_id(parent_id)?.ok_or_else(|| {
            StoreError::InvalidHierarchy(format!("parent category {} does not exist", parent_id))
        })?;
        if parent.category_type != category.category_type {
            return Err(StoreError::InvalidHierarchy(format!(
                "parent category {} is {} but category is {}",
                parent_id, parent.category_type, category.category_type
            )));
        }
        if !parent.is_top_level() {
            return Err(StoreError::InvalidHierarchy(format!(
                "parent category {} is itself a subcategory",
                parent_id
            )));
        }
        Ok(())
    }
}

fn map_category(row: &Row) -> rusqlite::Result<Category> {
    let type_str: String = row.get(2)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        category_type: type_str
            .parse()
            .map_err(rusqlite::Error::InvalidParameterName)?,
        is_preset: row.get(3)?,
        is_active: row.get(4)?,
        parent_id: row.get(5)?,
    })
}

fn validated(category: &Category) -> StoreResult<()> {
    let violations = category.validate();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(StoreError::InvalidCategory(violations))
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn get_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        let category = self
            .conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [id], map_category)
            .optional()?;
        Ok(category)
    }

    fn get_all(&self) -> StoreResult<Vec<Category>> {
        self.query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS), [])
    }

    fn get_active(&self) -> StoreResult<Vec<Category>> {
        self.query(&format!("{} WHERE is_active = 1 ORDER BY id ASC", SELECT_COLUMNS), [])
    }

    fn get_subcategories(&self, parent_id: i64) -> StoreResult<Vec<Category>> {
        self.query(
            &format!("{} WHERE parent_id = ?1 ORDER BY id ASC", SELECT_COLUMNS),
            [parent_id],
        )
    }

    fn insert(&self, category: &Category) -> StoreResult<()> {
        validated(category)?;
        if self.get_by_id(category.id)?.is_some() {
            return Err(StoreError::DuplicateId(category.id));
        }
        self.check_hierarchy(category)?;

        self.conn.execute(
            "INSERT INTO categories (id, name, type, is_preset, is_active, parent_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                category.id,
                category.name,
                category.category_type.as_str(),
                category.is_preset,
                category.is_active,
                category.parent_id,
            ],
        )?;
        debug!("Inserted category {} ({})", category.id, category.name);
        Ok(())
    }

    fn update(&self, category: &Category) -> StoreResult<()> {
        validated(category)?;
        if self.get_by_id(category.id)?.is_none() {
            return Err(StoreError::NotFound(category.id));
        }
        self.check_hierarchy(category)?;

        self.conn.execute(
            "UPDATE categories SET name = ?1, type = ?2, is_preset = ?3, is_active = ?4, parent_id = ?5 WHERE id = ?6",
            params![
                category.name,
                category.category_type.as_str(),
                category.is_preset,
                category.is_active,
                category.parent_id,
                category.id,
            ],
        )?;
        debug!("Updated category {}", category.id);
        Ok(())
    }

    fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        // Children are promoted to top level rather than left dangling.
        let tx = self.conn.unchecked_transaction()?;
        let promoted = tx.execute("UPDATE categories SET parent_id = NULL WHERE parent_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM categories WHERE id = ?1", [id])?;
        tx.commit()?;
        debug!("Deleted category {} (rows: {}, promoted children: {})", id, deleted, promoted);
        Ok(())
    }
}

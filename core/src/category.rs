//! Category records: the hierarchy level of the catalog.
//!
//! Parent/child links are stored as id references, never live object
//! pointers; cascade delete is the storage layer's foreign-key sweep.

use crate::db::{CatalogDb, parse_timestamp, validate_sort_order};
use crate::errors::{Result, ToolboxError};
use crate::slug::slugify;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

/// A persisted category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether this category sits at the top of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for category creation.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
}

impl NewCategory {
    /// A root category with default ordering.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parent_id: None,
            sort_order: 0,
        }
    }
}

/// Mutable category attributes. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

const SELECT_COLUMNS: &str =
    "id, name, slug, description, parent_id, sort_order, created_at, updated_at";

impl CatalogDb {
    /// Create a category. The slug is derived from the name and must not
    /// collide with any existing category's slug.
    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        self.ensure_ready()?;
        validate_sort_order(new.sort_order)?;
        let slug = derive_slug(&new.name)?;

        if let Some(parent_id) = new.parent_id
            && self.get_category(parent_id)?.is_none()
        {
            return Err(ToolboxError::not_found(format!(
                "parent category {parent_id} does not exist"
            )));
        }
        if self.slug_taken(&slug, None)? {
            return Err(ToolboxError::validation(format!(
                "slug '{slug}' is already taken"
            )));
        }

        let now = Utc::now();
        self.conn
            .execute(
                r#"
                INSERT INTO categories (name, slug, description, parent_id, sort_order, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    new.name,
                    slug,
                    new.description,
                    new.parent_id,
                    new.sort_order,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .map_err(|e| ToolboxError::db_with_source("failed to insert category", e))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, slug = %slug, "category created");

        Ok(Category {
            id,
            name: new.name.clone(),
            slug,
            description: new.description.clone(),
            parent_id: new.parent_id,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a category by id.
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.ensure_ready()?;
        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM categories WHERE id = ?1"),
                params![id],
                row_to_category,
            )
            .optional()
            .map_err(|e| ToolboxError::db_with_source("failed to get category", e))
    }

    /// Apply edits to a category. A name change recomputes the slug, which
    /// must not collide with another category's slug.
    pub fn update_category(&self, id: i64, update: &CategoryUpdate) -> Result<Category> {
        self.ensure_ready()?;
        let mut category = self
            .get_category(id)?
            .ok_or_else(|| ToolboxError::not_found(format!("category {id} does not exist")))?;

        if let Some(name) = &update.name {
            let slug = derive_slug(name)?;
            if slug != category.slug && self.slug_taken(&slug, Some(id))? {
                return Err(ToolboxError::validation(format!(
                    "slug '{slug}' is already taken"
                )));
            }
            category.name = name.clone();
            category.slug = slug;
        }
        if let Some(description) = &update.description {
            category.description = Some(description.clone());
        }
        if let Some(sort_order) = update.sort_order {
            validate_sort_order(sort_order)?;
            category.sort_order = sort_order;
        }
        category.updated_at = Utc::now();

        self.conn
            .execute(
                r#"
                UPDATE categories
                SET name = ?2, slug = ?3, description = ?4, sort_order = ?5, updated_at = ?6
                WHERE id = ?1
                "#,
                params![
                    id,
                    category.name,
                    category.slug,
                    category.description,
                    category.sort_order,
                    category.updated_at.to_rfc3339()
                ],
            )
            .map_err(|e| ToolboxError::db_with_source("failed to update category", e))?;

        Ok(category)
    }

    /// Delete a category, cascading to its children and projects.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        self.ensure_ready()?;
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])
            .map_err(|e| ToolboxError::db_with_source("failed to delete category", e))?;
        if deleted == 0 {
            return Err(ToolboxError::not_found(format!(
                "category {id} does not exist"
            )));
        }
        tracing::debug!(id, "category deleted");
        Ok(())
    }

    /// All categories, sorted by (sort_order, name).
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.ensure_ready()?;
        self.query_categories(
            &format!("SELECT {SELECT_COLUMNS} FROM categories ORDER BY sort_order, name"),
            params![],
        )
    }

    /// Categories without a parent, sorted by (sort_order, name).
    pub fn root_categories(&self) -> Result<Vec<Category>> {
        self.ensure_ready()?;
        self.query_categories(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM categories WHERE parent_id IS NULL ORDER BY sort_order, name"
            ),
            params![],
        )
    }

    /// Direct children of a category, sorted by (sort_order, name).
    pub fn children_of(&self, id: i64) -> Result<Vec<Category>> {
        self.ensure_ready()?;
        self.query_categories(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM categories WHERE parent_id = ?1 ORDER BY sort_order, name"
            ),
            params![id],
        )
    }

    fn query_categories(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| ToolboxError::db_with_source("failed to prepare category query", e))?;
        let rows = stmt
            .query_map(params, row_to_category)
            .map_err(|e| ToolboxError::db_with_source("failed to query categories", e))?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(
                row.map_err(|e| ToolboxError::db_with_source("failed to read category row", e))?,
            );
        }
        Ok(categories)
    }

    fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE slug = ?1",
                params![slug],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|e| ToolboxError::db_with_source("failed to check slug", e))?;
        Ok(match found {
            Some(id) => exclude_id != Some(id),
            None => false,
        })
    }
}

fn derive_slug(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(ToolboxError::validation("category name must not be empty"));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ToolboxError::validation(format!(
            "category name '{name}' yields an empty slug"
        )));
    }
    Ok(slug)
}

fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        parent_id: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?),
        updated_at: parse_timestamp(row.get(7)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_db() -> CatalogDb {
        let db = CatalogDb::open_in_memory().expect("open");
        db.init_schema().expect("init");
        db
    }

    #[test]
    fn create_derives_slug_from_name() {
        let db = test_db();
        let category = db
            .create_category(&NewCategory::named("Ollama Tools"))
            .expect("create");
        assert_eq!(category.slug, "ollama-tools");
        assert!(category.is_root());
    }

    #[test]
    fn empty_name_is_rejected() {
        let db = test_db();
        let err = db
            .create_category(&NewCategory::named("   "))
            .expect_err("must reject");
        assert!(matches!(err, ToolboxError::Validation { .. }));
    }

    #[test]
    fn negative_sort_order_is_rejected() {
        let db = test_db();
        let mut new = NewCategory::named("Tools");
        new.sort_order = -5;
        let err = db.create_category(&new).expect_err("must reject");
        assert!(matches!(err, ToolboxError::Validation { .. }));
        assert_eq!(db.count_categories().expect("count"), 0);
    }

    #[test]
    fn colliding_slugs_are_rejected() {
        let db = test_db();
        db.create_category(&NewCategory::named("Ollama Tools"))
            .expect("first");
        // Different display name, same normalized slug.
        let err = db
            .create_category(&NewCategory::named("ollama   tools!"))
            .expect_err("second must fail");
        assert!(matches!(err, ToolboxError::Validation { .. }));
        assert_eq!(db.count_categories().expect("count"), 1);
    }

    #[test]
    fn rename_recomputes_slug() {
        let db = test_db();
        let category = db
            .create_category(&NewCategory::named("Old Name"))
            .expect("create");
        let update = CategoryUpdate {
            name: Some("Fresh Name".to_string()),
            ..Default::default()
        };
        let updated = db.update_category(category.id, &update).expect("update");
        assert_eq!(updated.slug, "fresh-name");

        let reloaded = db
            .get_category(category.id)
            .expect("get")
            .expect("still exists");
        assert_eq!(reloaded.slug, "fresh-name");
    }

    #[test]
    fn rename_onto_taken_slug_is_rejected() {
        let db = test_db();
        db.create_category(&NewCategory::named("First")).expect("first");
        let second = db
            .create_category(&NewCategory::named("Second"))
            .expect("second");
        let update = CategoryUpdate {
            name: Some("first".to_string()),
            ..Default::default()
        };
        let err = db
            .update_category(second.id, &update)
            .expect_err("must reject");
        assert!(matches!(err, ToolboxError::Validation { .. }));
    }

    #[test]
    fn rename_to_same_slug_is_allowed() {
        let db = test_db();
        let category = db
            .create_category(&NewCategory::named("Same Name"))
            .expect("create");
        let update = CategoryUpdate {
            name: Some("SAME name".to_string()),
            ..Default::default()
        };
        let updated = db.update_category(category.id, &update).expect("update");
        assert_eq!(updated.slug, "same-name");
    }

    #[test]
    fn missing_parent_is_rejected() {
        let db = test_db();
        let mut new = NewCategory::named("Child");
        new.parent_id = Some(999);
        let err = db.create_category(&new).expect_err("must reject");
        assert!(matches!(err, ToolboxError::NotFound { .. }));
    }

    #[test]
    fn listing_is_sorted_by_sort_order_then_name() {
        let db = test_db();
        let mut c = NewCategory::named("Zeta");
        c.sort_order = 0;
        db.create_category(&c).expect("zeta");
        let mut a = NewCategory::named("Alpha");
        a.sort_order = 1;
        db.create_category(&a).expect("alpha");
        let mut m = NewCategory::named("Midway");
        m.sort_order = 0;
        db.create_category(&m).expect("midway");

        let names: Vec<String> = db
            .list_categories()
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Midway", "Zeta", "Alpha"]);
    }

    #[test]
    fn delete_cascades_to_children() {
        let db = test_db();
        let parent = db
            .create_category(&NewCategory::named("Parent"))
            .expect("parent");
        let mut child = NewCategory::named("Child");
        child.parent_id = Some(parent.id);
        let child = db.create_category(&child).expect("child");

        assert_eq!(db.children_of(parent.id).expect("children").len(), 1);
        db.delete_category(parent.id).expect("delete");
        assert!(db.get_category(child.id).expect("get").is_none());
        assert_eq!(db.count_categories().expect("count"), 0);
    }

    #[test]
    fn root_categories_excludes_children() {
        let db = test_db();
        let parent = db
            .create_category(&NewCategory::named("Parent"))
            .expect("parent");
        let mut child = NewCategory::named("Child");
        child.parent_id = Some(parent.id);
        db.create_category(&child).expect("child");

        let roots = db.root_categories().expect("roots");
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Parent");
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let db = test_db();
        let err = db.delete_category(42).expect_err("must fail");
        assert!(matches!(err, ToolboxError::NotFound { .. }));
    }
}

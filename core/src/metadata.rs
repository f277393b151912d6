//! Key/value metadata, either global (no owning project) or scoped to one
//! project. Global entries hold document-level settings such as the
//! generated README's title.

use crate::db::{CatalogDb, parse_timestamp};
use crate::errors::{Result, ToolboxError};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

/// Longest acceptable metadata key.
const MAX_KEY_LEN: usize = 255;

/// A persisted metadata entry.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    /// Whether this entry belongs to the catalog as a whole.
    pub fn is_global(&self) -> bool {
        self.project_id.is_none()
    }
}

const SELECT_COLUMNS: &str = "id, key, value, project_id, created_at, updated_at";

impl CatalogDb {
    /// Value stored for `key` in `scope`, or `None`. `scope = None` reads
    /// the global entry.
    pub fn get_metadata(&self, key: &str, scope: Option<i64>) -> Result<Option<String>> {
        self.ensure_ready()?;
        let result = match scope {
            Some(project_id) => self
                .conn
                .query_row(
                    "SELECT value FROM metadata WHERE key = ?1 AND project_id = ?2",
                    params![key, project_id],
                    |row| row.get(0),
                )
                .optional(),
            None => self
                .conn
                .query_row(
                    "SELECT value FROM metadata WHERE key = ?1 AND project_id IS NULL",
                    params![key],
                    |row| row.get(0),
                )
                .optional(),
        };
        result.map_err(|e| ToolboxError::db_with_source("failed to get metadata", e))
    }

    /// Upsert: overwrite the existing entry for (key, scope) or create a
    /// new one. The result reflects the final stored value.
    pub fn set_metadata(&self, key: &str, value: &str, scope: Option<i64>) -> Result<Metadata> {
        self.ensure_ready()?;
        validate_key(key)?;
        if value.is_empty() {
            return Err(ToolboxError::validation("metadata value must not be empty"));
        }
        if let Some(project_id) = scope
            && self.get_project(project_id)?.is_none()
        {
            return Err(ToolboxError::not_found(format!(
                "project {project_id} does not exist"
            )));
        }

        let now = Utc::now();
        match self.find_entry_id(key, scope)? {
            Some(id) => {
                self.conn
                    .execute(
                        "UPDATE metadata SET value = ?2, updated_at = ?3 WHERE id = ?1",
                        params![id, value, now.to_rfc3339()],
                    )
                    .map_err(|e| ToolboxError::db_with_source("failed to update metadata", e))?;
                tracing::debug!(key, ?scope, "metadata updated");
            }
            None => {
                self.conn
                    .execute(
                        r#"
                        INSERT INTO metadata (key, value, project_id, created_at, updated_at)
                        VALUES (?1, ?2, ?3, ?4, ?5)
                        "#,
                        params![key, value, scope, now.to_rfc3339(), now.to_rfc3339()],
                    )
                    .map_err(|e| ToolboxError::db_with_source("failed to insert metadata", e))?;
                tracing::debug!(key, ?scope, "metadata created");
            }
        }

        let entry = match scope {
            Some(project_id) => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {SELECT_COLUMNS} FROM metadata WHERE key = ?1 AND project_id = ?2"
                    ),
                    params![key, project_id],
                    row_to_metadata,
                )
                .map_err(|e| ToolboxError::db_with_source("failed to reload metadata", e))?,
            None => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {SELECT_COLUMNS} FROM metadata WHERE key = ?1 AND project_id IS NULL"
                    ),
                    params![key],
                    row_to_metadata,
                )
                .map_err(|e| ToolboxError::db_with_source("failed to reload metadata", e))?,
        };
        Ok(entry)
    }

    /// Remove the entry for (key, scope). Global entries have no owning
    /// project to cascade from, so this is their only removal path.
    pub fn delete_metadata(&self, key: &str, scope: Option<i64>) -> Result<()> {
        self.ensure_ready()?;
        let deleted = match scope {
            Some(project_id) => self.conn.execute(
                "DELETE FROM metadata WHERE key = ?1 AND project_id = ?2",
                params![key, project_id],
            ),
            None => self.conn.execute(
                "DELETE FROM metadata WHERE key = ?1 AND project_id IS NULL",
                params![key],
            ),
        }
        .map_err(|e| ToolboxError::db_with_source("failed to delete metadata", e))?;

        if deleted == 0 {
            return Err(ToolboxError::not_found(format!(
                "no metadata entry for key '{key}'"
            )));
        }
        Ok(())
    }

    /// All entries scoped to one project.
    pub fn metadata_for_project(&self, project_id: i64) -> Result<Vec<Metadata>> {
        self.ensure_ready()?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM metadata WHERE project_id = ?1 ORDER BY key"
            ))
            .map_err(|e| ToolboxError::db_with_source("failed to prepare metadata query", e))?;
        let rows = stmt
            .query_map(params![project_id], row_to_metadata)
            .map_err(|e| ToolboxError::db_with_source("failed to query metadata", e))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(
                row.map_err(|e| ToolboxError::db_with_source("failed to read metadata row", e))?,
            );
        }
        Ok(entries)
    }

    fn find_entry_id(&self, key: &str, scope: Option<i64>) -> Result<Option<i64>> {
        let result = match scope {
            Some(project_id) => self
                .conn
                .query_row(
                    "SELECT id FROM metadata WHERE key = ?1 AND project_id = ?2",
                    params![key, project_id],
                    |row| row.get(0),
                )
                .optional(),
            None => self
                .conn
                .query_row(
                    "SELECT id FROM metadata WHERE key = ?1 AND project_id IS NULL",
                    params![key],
                    |row| row.get(0),
                )
                .optional(),
        };
        result.map_err(|e| ToolboxError::db_with_source("failed to look up metadata", e))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ToolboxError::validation("metadata key must not be empty"));
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(ToolboxError::validation(format!(
            "metadata key must be at most {MAX_KEY_LEN} characters"
        )));
    }
    Ok(())
}

fn row_to_metadata(row: &Row) -> rusqlite::Result<Metadata> {
    Ok(Metadata {
        id: row.get(0)?,
        key: row.get(1)?,
        value: row.get(2)?,
        project_id: row.get(3)?,
        created_at: parse_timestamp(row.get(4)?),
        updated_at: parse_timestamp(row.get(5)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::NewCategory;
    use crate::project::NewProject;
    use pretty_assertions::assert_eq;

    fn test_db() -> CatalogDb {
        let db = CatalogDb::open_in_memory().expect("open");
        db.init_schema().expect("init");
        db
    }

    fn make_project(db: &CatalogDb) -> i64 {
        let category = db
            .create_category(&NewCategory::named("Tools"))
            .expect("category");
        db.create_project(&NewProject {
            category_id: category.id,
            name: "Ollama".to_string(),
            url: "https://github.com/ollama/ollama".to_string(),
            description: "Get up and running with large language models.".to_string(),
            features: vec![],
            sort_order: 0,
        })
        .expect("project")
        .id
    }

    #[test]
    fn set_then_get_round_trips() {
        let db = test_db();
        db.set_metadata("title", "Toolbox", None).expect("set");
        assert_eq!(
            db.get_metadata("title", None).expect("get"),
            Some("Toolbox".to_string())
        );
    }

    #[test]
    fn missing_key_reads_as_none() {
        let db = test_db();
        assert_eq!(db.get_metadata("absent", None).expect("get"), None);
    }

    #[test]
    fn repeated_set_overwrites_without_duplicating() {
        let db = test_db();
        db.set_metadata("title", "First", None).expect("set");
        let entry = db.set_metadata("title", "Second", None).expect("overwrite");
        assert_eq!(entry.value, "Second");
        assert!(entry.is_global());

        let rows: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM metadata WHERE key = 'title'",
                [],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(rows, 1);
    }

    #[test]
    fn global_and_project_scopes_are_independent() {
        let db = test_db();
        let project_id = make_project(&db);

        db.set_metadata("stars", "global-value", None).expect("set global");
        db.set_metadata("stars", "project-value", Some(project_id))
            .expect("set scoped");

        assert_eq!(
            db.get_metadata("stars", None).expect("get global"),
            Some("global-value".to_string())
        );
        assert_eq!(
            db.get_metadata("stars", Some(project_id)).expect("get scoped"),
            Some("project-value".to_string())
        );
    }

    #[test]
    fn project_delete_removes_scoped_but_not_global() {
        let db = test_db();
        let project_id = make_project(&db);
        db.set_metadata("stars", "global-value", None).expect("set global");
        db.set_metadata("stars", "project-value", Some(project_id))
            .expect("set scoped");

        db.delete_project(project_id).expect("delete project");

        assert!(db
            .metadata_for_project(project_id)
            .expect("scoped list")
            .is_empty());
        assert_eq!(
            db.get_metadata("stars", None).expect("get global"),
            Some("global-value".to_string())
        );
    }

    #[test]
    fn category_delete_sweeps_projects_and_their_metadata() {
        let db = test_db();
        let project_id = make_project(&db);
        let category_id = db
            .get_project(project_id)
            .expect("get project")
            .expect("exists")
            .category_id;
        db.set_metadata("stars", "project-value", Some(project_id))
            .expect("set scoped");
        db.set_metadata("stars", "global-value", None).expect("set global");

        // Two-hop cascade: the category delete removes the project, which
        // in turn removes its scoped metadata.
        db.delete_category(category_id).expect("delete category");

        assert!(db.get_project(project_id).expect("get project").is_none());
        let scoped_rows: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM metadata WHERE project_id IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .expect("count scoped rows");
        assert_eq!(scoped_rows, 0);
        assert_eq!(
            db.get_metadata("stars", None).expect("get global"),
            Some("global-value".to_string())
        );
    }

    #[test]
    fn scoped_set_requires_existing_project() {
        let db = test_db();
        let err = db
            .set_metadata("stars", "value", Some(999))
            .expect_err("must reject");
        assert!(matches!(err, ToolboxError::NotFound { .. }));
    }

    #[test]
    fn empty_key_or_value_is_rejected() {
        let db = test_db();
        assert!(matches!(
            db.set_metadata("", "value", None).expect_err("empty key"),
            ToolboxError::Validation { .. }
        ));
        assert!(matches!(
            db.set_metadata("key", "", None).expect_err("empty value"),
            ToolboxError::Validation { .. }
        ));
    }

    #[test]
    fn delete_removes_global_entry() {
        let db = test_db();
        db.set_metadata("title", "Toolbox", None).expect("set");
        db.delete_metadata("title", None).expect("delete");
        assert_eq!(db.get_metadata("title", None).expect("get"), None);

        let err = db.delete_metadata("title", None).expect_err("gone");
        assert!(matches!(err, ToolboxError::NotFound { .. }));
    }
}

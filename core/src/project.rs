//! Project records: the entries listed under each category.

use crate::db::{CatalogDb, parse_timestamp, validate_sort_order};
use crate::errors::{Result, ToolboxError};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use url::Url;

/// Shortest acceptable project description.
const MIN_DESCRIPTION_LEN: usize = 10;
/// Longest acceptable project name.
const MAX_NAME_LEN: usize = 255;

/// A persisted project.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub url: String,
    pub description: String,
    pub features: Vec<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for project creation.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub category_id: i64,
    pub name: String,
    pub url: String,
    pub description: String,
    pub features: Vec<String>,
    pub sort_order: i64,
}

/// Mutable project attributes. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

const SELECT_COLUMNS: &str =
    "id, category_id, name, url, description, features, sort_order, created_at, updated_at";

impl CatalogDb {
    /// Create a project under an existing category.
    pub fn create_project(&self, new: &NewProject) -> Result<Project> {
        self.ensure_ready()?;
        validate_name(&new.name)?;
        validate_url(&new.url)?;
        validate_description(&new.description)?;
        validate_sort_order(new.sort_order)?;
        if self.get_category(new.category_id)?.is_none() {
            return Err(ToolboxError::not_found(format!(
                "category {} does not exist",
                new.category_id
            )));
        }

        let now = Utc::now();
        self.conn
            .execute(
                r#"
                INSERT INTO projects (category_id, name, url, description, features, sort_order, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    new.category_id,
                    new.name,
                    new.url,
                    new.description,
                    encode_features(&new.features)?,
                    new.sort_order,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .map_err(|e| ToolboxError::db_with_source("failed to insert project", e))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %new.name, "project created");

        Ok(Project {
            id,
            category_id: new.category_id,
            name: new.name.clone(),
            url: new.url.clone(),
            description: new.description.clone(),
            features: new.features.clone(),
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a project by id.
    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        self.ensure_ready()?;
        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                row_to_project,
            )
            .optional()
            .map_err(|e| ToolboxError::db_with_source("failed to get project", e))
    }

    /// Apply edits to a project, with the same validation as creation.
    pub fn update_project(&self, id: i64, update: &ProjectUpdate) -> Result<Project> {
        self.ensure_ready()?;
        let mut project = self
            .get_project(id)?
            .ok_or_else(|| ToolboxError::not_found(format!("project {id} does not exist")))?;

        if let Some(name) = &update.name {
            validate_name(name)?;
            project.name = name.clone();
        }
        if let Some(url) = &update.url {
            validate_url(url)?;
            project.url = url.clone();
        }
        if let Some(description) = &update.description {
            validate_description(description)?;
            project.description = description.clone();
        }
        if let Some(sort_order) = update.sort_order {
            validate_sort_order(sort_order)?;
            project.sort_order = sort_order;
        }
        project.updated_at = Utc::now();

        self.conn
            .execute(
                r#"
                UPDATE projects
                SET name = ?2, url = ?3, description = ?4, sort_order = ?5, updated_at = ?6
                WHERE id = ?1
                "#,
                params![
                    id,
                    project.name,
                    project.url,
                    project.description,
                    project.sort_order,
                    project.updated_at.to_rfc3339()
                ],
            )
            .map_err(|e| ToolboxError::db_with_source("failed to update project", e))?;

        Ok(project)
    }

    /// Delete a project and its scoped metadata.
    pub fn delete_project(&self, id: i64) -> Result<()> {
        self.ensure_ready()?;
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .map_err(|e| ToolboxError::db_with_source("failed to delete project", e))?;
        if deleted == 0 {
            return Err(ToolboxError::not_found(format!(
                "project {id} does not exist"
            )));
        }
        tracing::debug!(id, "project deleted");
        Ok(())
    }

    /// Projects in one category, sorted by (sort_order, name).
    pub fn list_projects(&self, category_id: i64) -> Result<Vec<Project>> {
        self.ensure_ready()?;
        self.query_projects(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM projects WHERE category_id = ?1 ORDER BY sort_order, name"
            ),
            params![category_id],
        )
    }

    /// Projects under the category with the given slug, sorted by
    /// (sort_order, name).
    pub fn projects_by_category_slug(&self, slug: &str) -> Result<Vec<Project>> {
        self.ensure_ready()?;
        self.query_projects(
            r#"
            SELECT p.id, p.category_id, p.name, p.url, p.description, p.features,
                   p.sort_order, p.created_at, p.updated_at
            FROM projects p
            JOIN categories c ON c.id = p.category_id
            WHERE c.slug = ?1
            ORDER BY p.sort_order, p.name
            "#,
            params![slug],
        )
    }

    /// Append a feature to a project's feature list. Idempotent: adding an
    /// already-present feature is a no-op.
    pub fn add_feature(&self, project_id: i64, feature: &str) -> Result<Project> {
        self.ensure_ready()?;
        let mut project = self.get_project(project_id)?.ok_or_else(|| {
            ToolboxError::not_found(format!("project {project_id} does not exist"))
        })?;

        if project.features.iter().any(|f| f == feature) {
            return Ok(project);
        }
        project.features.push(feature.to_string());
        project.updated_at = Utc::now();

        self.conn
            .execute(
                "UPDATE projects SET features = ?2, updated_at = ?3 WHERE id = ?1",
                params![
                    project_id,
                    encode_features(&project.features)?,
                    project.updated_at.to_rfc3339()
                ],
            )
            .map_err(|e| ToolboxError::db_with_source("failed to update features", e))?;

        Ok(project)
    }

    fn query_projects(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| ToolboxError::db_with_source("failed to prepare project query", e))?;
        let rows = stmt
            .query_map(params, row_to_project)
            .map_err(|e| ToolboxError::db_with_source("failed to query projects", e))?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(
                row.map_err(|e| ToolboxError::db_with_source("failed to read project row", e))?,
            );
        }
        Ok(projects)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ToolboxError::validation("project name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ToolboxError::validation(format!(
            "project name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|_| ToolboxError::validation(format!("'{raw}' is not a valid URL")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ToolboxError::validation(format!(
            "URL scheme must be http or https, got '{scheme}'"
        ))),
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ToolboxError::validation(format!(
            "description must be at least {MIN_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// Feature-list column encoding. The domain type is `Vec<String>`; the
/// JSON text representation never leaves this module.
fn encode_features(features: &[String]) -> Result<String> {
    serde_json::to_string(features)
        .map_err(|e| ToolboxError::db_with_source("failed to encode features", e))
}

/// Tolerant decode: malformed or legacy column contents read as an empty
/// list rather than failing the whole row.
fn decode_features(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(&s).ok())
        .unwrap_or_default()
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        description: row.get(4)?,
        features: decode_features(row.get(5)?),
        sort_order: row.get(6)?,
        created_at: parse_timestamp(row.get(7)?),
        updated_at: parse_timestamp(row.get(8)?),
    })
}

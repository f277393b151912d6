//! Catalog database handle.
//!
//! Wraps a single SQLite connection. The handle is passed explicitly to
//! every domain operation; there is no process-global connection, so tests
//! can run against throwaway in-memory stores.
//!
//! Opening a store does not create the schema. `init_schema` is a separate,
//! idempotent step, and every domain operation guards on `is_ready` so a
//! missing schema surfaces as `NotInitialized` instead of a low-level
//! SQLite error.

use crate::errors::{Result, ToolboxError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Embedded schema SQL from SCHEMA.sql
const SCHEMA_SQL: &str = include_str!("../SCHEMA.sql");

/// Tables that must exist before any domain operation runs.
const REQUIRED_TABLES: [&str; 4] = ["categories", "projects", "metadata", "schema_migrations"];

/// Migration versions recorded by `init_schema`.
const MIGRATION_VERSIONS: [&str; 3] = ["20250127000001", "20250127000002", "20250127000003"];

/// Handle to a catalog store.
pub struct CatalogDb {
    pub(crate) conn: Connection,
}

impl CatalogDb {
    /// Open (or create) the store file at `path`.
    ///
    /// Creates parent directories as needed. Does not create the schema;
    /// call [`CatalogDb::init_schema`] for that.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ToolboxError::io_with_source(
                    format!("failed to create db directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            ToolboxError::db_with_source(format!("failed to open db at {}", path.display()), e)
        })?;

        let db = Self::with_connection(conn)?;
        tracing::debug!(path = %path.display(), "catalog db opened");
        Ok(db)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ToolboxError::db_with_source("failed to open in-memory db", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // SQLite ships with foreign keys off; every cascade in the schema
        // depends on this pragma.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| ToolboxError::db_with_source("failed to enable foreign keys", e))?;
        Ok(Self { conn })
    }

    /// Apply the schema. Idempotent: re-running against an initialized
    /// store is a no-op.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| ToolboxError::db_with_source("failed to apply schema", e))?;

        for version in MIGRATION_VERSIONS {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO schema_migrations (version) VALUES (?1)",
                    params![version],
                )
                .map_err(|e| {
                    ToolboxError::db_with_source("failed to record migration version", e)
                })?;
        }

        tracing::debug!("catalog schema initialized");
        Ok(())
    }

    /// Whether all required tables exist.
    pub fn is_ready(&self) -> Result<bool> {
        for table in REQUIRED_TABLES {
            if !self.table_exists(table)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fail fast with `NotInitialized` when the schema is missing.
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.is_ready()? {
            Ok(())
        } else {
            Err(ToolboxError::NotInitialized)
        }
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| ToolboxError::db_with_source("failed to inspect schema", e))?;
        Ok(found.is_some())
    }

    /// Total number of categories.
    pub fn count_categories(&self) -> Result<i64> {
        self.ensure_ready()?;
        self.conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .map_err(|e| ToolboxError::db_with_source("failed to count categories", e))
    }

    /// Total number of projects.
    pub fn count_projects(&self) -> Result<i64> {
        self.ensure_ready()?;
        self.conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .map_err(|e| ToolboxError::db_with_source("failed to count projects", e))
    }

    /// Number of projects in one category.
    pub fn count_projects_in(&self, category_id: i64) -> Result<i64> {
        self.ensure_ready()?;
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM projects WHERE category_id = ?1",
                params![category_id],
                |row| row.get(0),
            )
            .map_err(|e| ToolboxError::db_with_source("failed to count projects", e))
    }
}

/// Reject negative sort orders before they reach the store.
pub(crate) fn validate_sort_order(value: i64) -> Result<()> {
    if value < 0 {
        return Err(ToolboxError::validation(format!(
            "sort_order must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Lenient RFC 3339 parse for timestamp columns.
pub(crate) fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

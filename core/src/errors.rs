//! Error taxonomy for catalog operations.
//!
//! Every failure is local to a single operation; there is no retry or
//! partial-failure recovery. Read-path misses (`get_metadata` on an absent
//! key) are `Ok(None)`, not errors.

use thiserror::Error;

/// Catalog error with kind and context.
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// A domain invariant was violated before anything was persisted.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The store is missing required tables; run schema initialization.
    #[error("database not initialized")]
    NotInitialized,

    /// A required reference (category id, project id, metadata key) did
    /// not resolve.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The operation refuses to run against the current store contents.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Errors opening or querying the SQLite store.
    #[error("database error: {message}")]
    Db {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Template parse or render failure.
    #[error("template error: {message}")]
    Template { message: String },

    /// Filesystem failures around the store or template files.
    #[error("io error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ToolboxError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn db(message: impl Into<String>) -> Self {
        Self::Db {
            message: message.into(),
            source: None,
        }
    }

    /// Create a database error with source
    pub fn db_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Db {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an io error with source
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, ToolboxError>;

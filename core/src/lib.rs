//! AI Engineering Toolbox core.
//!
//! A catalog of categories, projects, and key/value metadata persisted in
//! a single-file SQLite store, plus a deterministic generator that renders
//! the catalog into a README-style document.
//!
//! The [`CatalogDb`] handle is passed explicitly to every operation; there
//! is no process-global connection. Opening a store and creating its
//! schema are separate steps, and every domain operation fails fast with
//! [`ToolboxError::NotInitialized`] until the schema exists.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod category;
pub mod db;
pub mod errors;
pub mod generator;
pub mod metadata;
pub mod project;
pub mod sample_data;
pub mod slug;
pub mod template;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use db::CatalogDb;
pub use errors::{Result, ToolboxError};
pub use generator::{DEFAULT_DESCRIPTION, DEFAULT_TITLE, Generator};
pub use metadata::Metadata;
pub use project::{NewProject, Project, ProjectUpdate};
pub use sample_data::load_sample_data;
pub use slug::slugify;
pub use template::{Scope, Template, Value};

/// Crate version, surfaced by the CLI's `version` command.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

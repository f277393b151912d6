//! Catalog generator: renders the persisted catalog into a document.
//!
//! Output is a pure function of store state and template. Categories and
//! projects are iterated in their (sort_order, name) ordering and scope
//! maps are BTreeMaps, so two generations over unchanged state are
//! byte-identical.

use crate::db::CatalogDb;
use crate::errors::Result;
use crate::template::{Scope, Template, Value};
use std::path::Path;

/// Document title when no global `title` metadata is set.
pub const DEFAULT_TITLE: &str = "AI Engineering Toolbox";
/// Document description when no global `description` metadata is set.
pub const DEFAULT_DESCRIPTION: &str =
    "A list of open-source tools and resources for AI Engineering";

/// Default template, compiled into the binary. Works without any external
/// file dependencies.
const DEFAULT_TEMPLATE: &str = include_str!("../templates/readme.md");

/// Renders the catalog into a text document.
pub struct Generator<'a> {
    db: &'a CatalogDb,
    template: Template,
}

impl<'a> Generator<'a> {
    /// Generator using the embedded default template.
    pub fn new(db: &'a CatalogDb) -> Result<Self> {
        tracing::debug!("template resolved from embedded default");
        Self::with_template_source(db, DEFAULT_TEMPLATE)
    }

    /// Generator using a caller-supplied template file.
    pub fn with_template_path(db: &'a CatalogDb, path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            crate::errors::ToolboxError::io_with_source(
                format!("failed to read template at {}", path.display()),
                e,
            )
        })?;
        tracing::debug!(path = %path.display(), "template resolved from override path");
        Self::with_template_source(db, &source)
    }

    /// Generator from raw template source.
    pub fn with_template_source(db: &'a CatalogDb, source: &str) -> Result<Self> {
        Ok(Self {
            db,
            template: Template::parse(source)?,
        })
    }

    /// Render the current store state. The caller decides where the text
    /// goes; nothing is written here.
    pub fn generate(&self) -> Result<String> {
        let title = self
            .db
            .get_metadata("title", None)?
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let description = self
            .db
            .get_metadata("description", None)?
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        let mut root = Scope::new();
        root.insert("title".to_string(), Value::Text(title));
        root.insert("description".to_string(), Value::Text(description));

        let mut category_scopes = Vec::new();
        for category in self.db.list_categories()? {
            let mut scope = Scope::new();
            scope.insert("name".to_string(), Value::Text(category.name.clone()));
            scope.insert("slug".to_string(), Value::Text(category.slug.clone()));
            // Always bound, so an absent description shadows the document
            // description instead of leaking it into the section.
            scope.insert(
                "description".to_string(),
                Value::Text(category.description.clone().unwrap_or_default()),
            );

            let mut project_scopes = Vec::new();
            for project in self.db.list_projects(category.id)? {
                let mut ps = Scope::new();
                ps.insert("name".to_string(), Value::Text(project.name.clone()));
                ps.insert("url".to_string(), Value::Text(project.url.clone()));
                ps.insert(
                    "description".to_string(),
                    Value::Text(project.description.clone()),
                );
                let features = project
                    .features
                    .iter()
                    .map(|feature| {
                        let mut fs = Scope::new();
                        fs.insert("feature".to_string(), Value::Text(feature.clone()));
                        fs
                    })
                    .collect();
                ps.insert("features".to_string(), Value::List(features));
                project_scopes.push(ps);
            }
            scope.insert("projects".to_string(), Value::List(project_scopes));
            category_scopes.push(scope);
        }
        root.insert("categories".to_string(), Value::List(category_scopes));

        Ok(self.template.render(&root))
    }
}

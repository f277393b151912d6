//! Fixed illustrative dataset for demos and first runs.

use crate::category::NewCategory;
use crate::db::CatalogDb;
use crate::errors::{Result, ToolboxError};
use crate::project::NewProject;

struct SampleProject {
    name: &'static str,
    url: &'static str,
    description: &'static str,
    features: &'static [&'static str],
}

struct SampleCategory {
    name: &'static str,
    description: &'static str,
    projects: &'static [SampleProject],
}

const SAMPLE_CATEGORIES: &[SampleCategory] = &[
    SampleCategory {
        name: "Application Development Frameworks",
        description: "Frameworks for building AI applications",
        projects: &[
            SampleProject {
                name: "LangChain",
                url: "https://github.com/langchain-ai/langchain",
                description: "LangChain is a framework for building LLM-powered applications. It helps you chain together interoperable components and third-party integrations to simplify AI application development — all while future-proofing decisions as the underlying technology evolves.",
                features: &[
                    "Component chaining",
                    "Third-party integrations",
                    "Future-proof architecture",
                ],
            },
            SampleProject {
                name: "LangGraph",
                url: "https://github.com/langchain-ai/langgraph",
                description: "Trusted by companies shaping the future of agents – including Klarna, Replit, Elastic, and more – LangGraph is a low-level orchestration framework for building, managing, and deploying long-running, stateful agents.",
                features: &[
                    "Low-level orchestration",
                    "Stateful agents",
                    "Agent management",
                ],
            },
        ],
    },
    SampleCategory {
        name: "Local AI & Model Deployment",
        description: "Tools for running AI models locally",
        projects: &[SampleProject {
            name: "Ollama",
            url: "https://github.com/ollama/ollama",
            description: "Get up and running with large language models.",
            features: &[
                "Local model hosting",
                "Easy setup",
                "Multiple model support",
            ],
        }],
    },
];

/// Load the sample dataset: two categories, three projects, and the two
/// global metadata entries the generator reads.
///
/// Refuses with `Conflict` when the store already holds any category or
/// project, so repeated loads never duplicate rows.
pub fn load_sample_data(db: &CatalogDb) -> Result<()> {
    db.ensure_ready()?;
    if db.count_categories()? > 0 || db.count_projects()? > 0 {
        return Err(ToolboxError::conflict(
            "store already contains data; sample data can only seed an empty catalog",
        ));
    }

    for (index, sample) in SAMPLE_CATEGORIES.iter().enumerate() {
        let category = db.create_category(&NewCategory {
            name: sample.name.to_string(),
            description: Some(sample.description.to_string()),
            parent_id: None,
            sort_order: index as i64,
        })?;

        for (project_index, project) in sample.projects.iter().enumerate() {
            db.create_project(&NewProject {
                category_id: category.id,
                name: project.name.to_string(),
                url: project.url.to_string(),
                description: project.description.to_string(),
                features: project.features.iter().map(|f| f.to_string()).collect(),
                sort_order: project_index as i64,
            })?;
        }
    }

    db.set_metadata("title", "AI Engineering Toolbox", None)?;
    db.set_metadata(
        "description",
        "A list of open-source tools and resources for AI Engineering",
        None,
    )?;

    tracing::info!(
        categories = db.count_categories()?,
        projects = db.count_projects()?,
        "sample data loaded"
    );
    Ok(())
}

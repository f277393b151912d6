//! `toolbox` command surface.
//!
//! Thin shell over `toolbox_core`: argument parsing, user-facing output,
//! and exit status. All catalog logic lives in the core crate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use toolbox_core::{CatalogDb, Generator, ToolboxError, load_sample_data};

#[derive(Debug, Parser)]
#[command(name = "toolbox", about = "AI Engineering Toolbox catalog manager")]
pub struct Cli {
    /// Path to the catalog database
    #[arg(long = "db", global = true, default_value = "toolbox.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show version information
    Version,
    /// Initialize database with schema
    Init,
    /// Show database statistics
    Stats,
    /// Load sample data for demonstration
    Demo,
    /// Generate README.md from database
    Generate(GenerateArgs),
    /// Read or write catalog metadata
    Meta {
        #[command(subcommand)]
        cmd: MetaCommand,
    },
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Output file path
    #[arg(long, short = 'o', default_value = "README.md")]
    output: PathBuf,

    /// Template override path (defaults to the embedded template)
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum MetaCommand {
    /// Print the value stored for a key
    Get {
        key: String,
        /// Read the entry scoped to a project instead of the global entry
        #[arg(long)]
        project: Option<i64>,
    },
    /// Store a value for a key
    Set {
        key: String,
        value: String,
        /// Scope the entry to a project instead of the whole catalog
        #[arg(long)]
        project: Option<i64>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.cmd {
            Command::Version => {
                println!("AI Engineering Toolbox v{}", toolbox_core::VERSION);
                Ok(())
            }
            Command::Init => run_init(&self.db),
            Command::Stats => run_stats(&self.db),
            Command::Demo => run_demo(&self.db),
            Command::Generate(args) => run_generate(&self.db, &args),
            Command::Meta { cmd } => run_meta(&self.db, cmd),
        }
    }
}

fn open_db(path: &Path) -> Result<CatalogDb> {
    CatalogDb::open(path)
        .with_context(|| format!("failed to open catalog database at {}", path.display()))
}

/// Open a store and require the schema, pointing the operator at `init`
/// when it is missing.
fn open_ready_db(path: &Path) -> Result<CatalogDb> {
    let db = open_db(path)?;
    if !db.is_ready()? {
        bail!("Database not initialized. Run 'toolbox init' to set up the database.");
    }
    Ok(db)
}

fn run_init(path: &Path) -> Result<()> {
    let db = open_db(path)?;
    db.init_schema()?;
    println!("✅ Database initialized successfully!");
    println!("📍 Database location: {}", path.display());
    Ok(())
}

fn run_stats(path: &Path) -> Result<()> {
    let db = open_ready_db(path)?;
    let category_count = db.count_categories()?;
    let project_count = db.count_projects()?;

    println!("📊 AI Engineering Toolbox Statistics");
    println!("   Categories: {category_count}");
    println!("   Projects: {project_count}");

    if category_count > 0 {
        println!();
        println!("📁 Categories:");
        for category in db.list_categories()? {
            let projects = db.count_projects_in(category.id)?;
            println!("   {} ({projects} projects)", category.name);
        }
    }
    Ok(())
}

fn run_demo(path: &Path) -> Result<()> {
    let db = open_ready_db(path)?;
    match load_sample_data(&db) {
        Ok(()) => {
            println!("✅ Sample data loaded successfully!");
            println!("   Categories: {}", db.count_categories()?);
            println!("   Projects: {}", db.count_projects()?);
            println!();
            println!("Try: toolbox stats");
            println!("Or:  toolbox generate --output demo.md");
            Ok(())
        }
        // Reported, not fatal: the existing catalog is left untouched.
        Err(ToolboxError::Conflict { .. }) => {
            println!("⚠️  Database already contains data. Sample data was not loaded.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn run_generate(path: &Path, args: &GenerateArgs) -> Result<()> {
    let db = open_ready_db(path)?;
    let generator = match &args.template {
        Some(template) => Generator::with_template_path(&db, template)?,
        None => Generator::new(&db)?,
    };
    let content = generator.generate()?;

    std::fs::write(&args.output, content)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("✅ Generated {} successfully!", args.output.display());
    Ok(())
}

fn run_meta(path: &Path, cmd: MetaCommand) -> Result<()> {
    let db = open_ready_db(path)?;
    match cmd {
        MetaCommand::Get { key, project } => {
            match db.get_metadata(&key, project)? {
                Some(value) => println!("{value}"),
                None => println!("(no value set for '{key}')"),
            }
            Ok(())
        }
        MetaCommand::Set { key, value, project } => {
            db.set_metadata(&key, &value, project)?;
            println!("✅ Set '{key}'");
            Ok(())
        }
    }
}

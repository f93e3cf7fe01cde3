use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;

use app::App;
use ticklist::config::Config;
use ticklist::filter::{CategoriesViewFilter, TodosViewFilter};
use ticklist::storage::{Database, DatabaseError};

/// Get the config directory path (~/.config/ticklist/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("ticklist"))
}

#[derive(Parser, Debug)]
#[command(name = "ticklist", version, about = "A small to-do list with categories and undo")]
struct Args {
    /// Config file (defaults to ~/.config/ticklist/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides `database_path` from the config)
    #[arg(long, value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    /// Skip confirmation and undo prompts
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a todo
    Add {
        /// Title words
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Category id (or unique id prefix) or name
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List todos through the current view filter
    List {
        /// all, active or completed (defaults to the saved filter)
        #[arg(short, long)]
        filter: Option<TodosViewFilter>,
        /// Only todos in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one todo in full
    Show { id: String },
    /// Change a todo's fields
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, conflicts_with = "no_category")]
        category: Option<String>,
        /// Remove the todo from its category
        #[arg(long)]
        no_category: bool,
    },
    /// Mark a todo completed
    Done { id: String },
    /// Mark a todo not completed
    Reopen { id: String },
    /// Delete a todo (with undo)
    Rm { id: String },
    /// Delete every completed todo
    ClearCompleted,
    /// Mark every todo completed
    CompleteAll {
        /// Mark every todo not completed instead
        #[arg(long)]
        incomplete: bool,
    },
    /// Complete all todos, or reopen all if every todo is already completed
    ToggleAll,
    /// Show completion counts
    Stats,
    /// Save the default list filter
    Filter {
        mode: TodosViewFilter,
        /// Also group the list by this category
        #[arg(short, long, conflicts_with = "any_category")]
        category: Option<String>,
        /// Stop grouping by category
        #[arg(long)]
        any_category: bool,
    },
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CategoryCommand {
    /// Add a category
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// List categories
    List {
        /// all, active or inactive (defaults to the saved filter)
        #[arg(short, long)]
        filter: Option<CategoriesViewFilter>,
    },
    /// Rename a category
    Rename {
        id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Mark a category active
    Activate { id: String },
    /// Mark a category inactive
    Deactivate { id: String },
    /// Delete a category (with undo)
    Rm { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = match &args.db {
        Some(path) => path.clone(),
        None => config.database_path_in(&config_dir),
    };
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory {}", parent.display())
            })?;

            // User-only access to the directory holding the database
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o700);
                if let Err(e) = std::fs::set_permissions(parent, perms) {
                    tracing::warn!(
                        path = %parent.display(),
                        error = %e,
                        "Failed to set data directory permissions to 0700"
                    );
                }
            }
        }
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db.with_max_value_bytes(config.max_value_bytes),
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: The ticklist database is locked by another process. Please try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let mut app = App::open(db, config, args.yes)
        .await
        .context("Failed to load todo lists")?;

    let mut stdout = std::io::stdout().lock();
    let result = app.run(args.command, &mut stdout).await;
    app.close().await;
    result
}

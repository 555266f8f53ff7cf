//! `lookbook` — maintenance CLI for the lookbook product catalog.
//!
//! Seeds the denormalized catalog, runs the department normalization,
//! and inspects the result.
//!
//! # Usage
//!
//! ```
//! lookbook seed
//! lookbook migrate
//! lookbook products --limit 10
//! lookbook stats --json
//! lookbook verify
//! ```

mod commands;
mod demo;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lookbook_store_sqlite::CatalogStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lookbook", version, about = "Lookbook catalog maintenance")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lookbook.toml")]
  config: PathBuf,

  /// Database file; overrides the config file.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Load the built-in demo catalog in its denormalized shape.
  Seed,
  /// Normalize the catalog: extract departments, link products, and
  /// enforce the foreign key.
  Migrate,
  /// List products joined with their departments.
  Products {
    #[arg(short, long, default_value = "20")]
    limit: u32,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
  },
  /// List departments.
  Departments {
    #[arg(long)]
    json: bool,
  },
  /// Per-department aggregates and price bands.
  Stats {
    #[arg(long)]
    json: bool,
  },
  /// Inspect the database: tables, schema, and counts.
  Verify {
    #[arg(long)]
    json: bool,
  },
}

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_db_path() -> PathBuf {
  PathBuf::from("lookbook.db")
}

/// Shape of the optional TOML configuration file. Every field can also
/// be set through the environment with a `LOOKBOOK_` prefix.
#[derive(Debug, Clone, Deserialize)]
struct CliConfig {
  /// Path to the SQLite database file.
  #[serde(default = "default_db_path")]
  db_path: PathBuf,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LOOKBOOK"))
    .build()
    .context("failed to read configuration")?;
  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  // The --db flag wins over config file and environment.
  let db_path = cli.db.unwrap_or(cfg.db_path);
  tracing::debug!("opening catalog at {db_path:?}");

  let store = CatalogStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open catalog at {db_path:?}"))?;

  match cli.command {
    Commands::Seed => commands::seed(&store).await,
    Commands::Migrate => commands::migrate(&store).await,
    Commands::Products { limit, json } => {
      commands::products(&store, limit, json).await
    },
    Commands::Departments { json } => commands::departments(&store, json).await,
    Commands::Stats { json } => commands::stats(&store, json).await,
    Commands::Verify { json } => commands::verify(&store, json).await,
  }
}

//! Relgraph CLI - operator tooling for the relationship catalog

use clap::{Parser, Subcommand};
use relgraph::config::{self, RelgraphConfig};
use relgraph::discovery::{find_indirect_paths, DEFAULT_MAX_HOPS};
use relgraph::migrate::Migrator;
use relgraph::relationship::RelationKind;
use relgraph::storage::SqliteStore;
use relgraph::ui;
use relgraph::RelationGraph;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "relgraph")]
#[command(version)]
#[command(about = "Relationship graph and derivation engine for tabular data catalogs")]
#[command(long_about = r#"
Relgraph catalogs tables and fields across data sources and derives typed
relationships between them:
  • Import raw relationship records from legacy exports
  • Migrate them into four typed collections (direct/inverse/indirect/self)
  • Discover multi-hop connection paths between tables

Example usage:
  relgraph import --file relationships.json
  relgraph migrate --clear
  relgraph paths --max-hops 3
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Path for the config file
        #[arg(short, long, default_value = "relgraph.toml")]
        config: PathBuf,

        /// Database path to record in the config
        #[arg(short, long)]
        database: Option<String>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Import raw relationship records from a JSON file
    Import {
        /// JSON file containing an array of raw relationship records
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the database file
        #[arg(short, long, default_value = "relgraph.db")]
        database: PathBuf,
    },

    /// Classify raw records into the four typed collections
    Migrate {
        /// Path to the database file
        #[arg(short, long, default_value = "relgraph.db")]
        database: PathBuf,

        /// Clear the typed collections first (makes the run idempotent)
        #[arg(short, long)]
        clear: bool,
    },

    /// Discover multi-hop connection paths between tables
    Paths {
        /// Path to the database file
        #[arg(short, long, default_value = "relgraph.db")]
        database: PathBuf,

        /// Maximum number of hops per path
        #[arg(short, long, default_value_t = DEFAULT_MAX_HOPS)]
        max_hops: usize,
    },

    /// Show statistics about the stored catalog
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "relgraph.db")]
        database: PathBuf,
    },
}

/// Prefer the config file's database path when the CLI was left at its default
fn resolve_database(cli_path: PathBuf) -> PathBuf {
    if cli_path != PathBuf::from("relgraph.db") {
        return cli_path;
    }
    match config::load_config(None) {
        Ok(Some(cfg)) => cfg.database.map(PathBuf::from).unwrap_or(cli_path),
        _ => cli_path,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { config: config_path, database, force } => {
            let database = database.unwrap_or_else(|| {
                config::default_database_path_in(std::path::Path::new("."))
                    .to_string_lossy()
                    .into_owned()
            });
            let settings = RelgraphConfig {
                database: Some(database.clone()),
                max_hops: Some(DEFAULT_MAX_HOPS),
            };
            config::write_config(&config_path, &settings, force)?;
            config::ensure_db_dir(&PathBuf::from(&database))?;
            ui::success(&format!("Wrote config to {}", config_path.display()));
        }

        Commands::Import { file, database } => {
            let database = resolve_database(database);
            ui::header(&format!("Importing raw relationships from {}", file.display()));
            let contents = std::fs::read_to_string(&file)?;
            let records: Vec<relgraph::RawRelationshipRecord> = serde_json::from_str(&contents)?;

            config::ensure_db_dir(&database)?;
            let store = SqliteStore::open(&database)?;
            for record in &records {
                store.insert_raw(record)?;
            }
            ui::success(&format!(
                "Imported {} records into {}",
                records.len(),
                database.display()
            ));
        }

        Commands::Migrate { database, clear } => {
            let database = resolve_database(database);
            ui::header(&format!("Migrating raw relationships in {}", database.display()));
            let store = SqliteStore::open(&database)?;
            let migrator = Migrator::new(&store);

            if clear {
                let removed = migrator.clear_typed()?;
                ui::info("Cleared typed collections", &removed.to_string());
            }

            let report = migrator.run()?;
            println!("{}", ui::report_table(&report));
            if report.error_count > 0 {
                ui::warn(&format!("{} records failed to persist", report.error_count));
            } else {
                ui::success("Migration complete");
            }
        }

        Commands::Paths { database, max_hops } => {
            let database = resolve_database(database);
            let store = SqliteStore::open(&database)?;
            let direct = store.load_relationships(RelationKind::Direct)?;
            let graph = RelationGraph::build(&direct);

            ui::header(&format!("Discovering paths (max {max_hops} hops)"));
            println!("{}", graph.stats());

            let candidates = find_indirect_paths(&graph, max_hops);
            if candidates.is_empty() {
                println!("No connection paths found.");
            } else {
                ui::section("Path candidates");
                for candidate in &candidates {
                    println!(
                        "  {} {} ({} hop{})",
                        ui::Icons::LINK,
                        candidate,
                        candidate.hops(),
                        if candidate.hops() == 1 { "" } else { "s" }
                    );
                }
                ui::summary_row("Total", &candidates.len().to_string());
            }
        }

        Commands::Stats { database } => {
            let database = resolve_database(database);
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;
            ui::header("Catalog statistics");
            println!(
                "{}",
                ui::counts_table(&[
                    ("Tables", stats.tables),
                    ("Fields", stats.fields),
                    ("Raw relationships", stats.raw),
                    ("Direct", stats.direct),
                    ("Inverse", stats.inverse),
                    ("Indirect", stats.indirect),
                    ("Self", stats.self_ref),
                ])
            );
        }
    }

    Ok(())
}

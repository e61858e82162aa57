use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cinema_catalog::config::CommonArgs;
use cinema_catalog::logging::init_tracing;
use cinema_catalog::{count_rows, import_files, open_database, ImportSummary};

/// Cinema Catalog - actors, movies, and who played in what
#[derive(Parser)]
#[command(name = "cinema-catalog", version)]
#[command(about = "Manage the actor/movie catalog database", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables
    Init,

    /// Load actors, movies, and relations from CSV files
    Import {
        /// CSV with name,gender,date_of_birth (DD.MM.YYYY)
        #[arg(long)]
        actors: Option<PathBuf>,

        /// CSV with name,genre,year
        #[arg(long)]
        movies: Option<PathBuf>,

        /// CSV with actor,movie (names)
        #[arg(long)]
        relations: Option<PathBuf>,
    },

    /// Show record counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.common.log_level);

    let conn = open_database(&cli.common.database)
        .with_context(|| format!("Failed to open database {}", cli.common.database.display()))?;

    match cli.command {
        Commands::Init => {
            println!("✓ Database ready: {}", cli.common.database.display());
        }
        Commands::Import {
            actors,
            movies,
            relations,
        } => {
            if actors.is_none() && movies.is_none() && relations.is_none() {
                anyhow::bail!("Nothing to import: pass --actors, --movies and/or --relations");
            }

            let report = import_files(
                &conn,
                actors.as_deref(),
                movies.as_deref(),
                relations.as_deref(),
            )?;

            print_summary("Actors", &report.actors);
            print_summary("Movies", &report.movies);
            print_summary("Relations", &report.relations);
        }
        Commands::Stats => {
            println!("Actors:    {}", count_rows(&conn, "actors")?);
            println!("Movies:    {}", count_rows(&conn, "movies")?);
            println!("Relations: {}", count_rows(&conn, "association")?);
        }
    }

    Ok(())
}

fn print_summary(label: &str, summary: &ImportSummary) {
    println!(
        "✓ {}: {} inserted, {} skipped, {} rejected",
        label, summary.inserted, summary.skipped, summary.rejected
    );
}

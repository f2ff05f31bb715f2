//! SNOMED CT DuckDB loader binary.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use snomed_duck::{DuckDbClient, LoaderConfig, LoaderError, Orchestrator, PackageRoot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// SNOMED-CT DuckDB loader.
///
/// Imports SNOMED-CT RF2 files from an Edition package into DuckDB and
/// launches a web-based UI for interactive queries.
#[derive(Parser)]
#[command(name = "snomed-duck", version)]
struct Cli {
    /// Path to the SNOMED-CT package (release directory or zip archive)
    #[arg(long, default_value = "")]
    package: PathBuf,

    /// Path to the DuckDB database file (omit for in-memory mode)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory containing the schema DDL and validation SQL scripts
    #[arg(long)]
    sql_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error @ LoaderError::InvalidPackage) => {
            tracing::error!("{error}");
            let _ = Cli::command().print_help();
            ExitCode::from(2)
        }
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LoaderError> {
    let package = PackageRoot::resolve(&cli.package)?;

    let mut config = LoaderConfig::default();
    if let Some(sql_dir) = cli.sql_dir {
        config.sql_resources = sql_dir;
    }

    let client = DuckDbClient::open(cli.db.as_deref())?;
    let outcome = Orchestrator::new(&client, config).run(package.path());

    if let Ok(summary) = &outcome {
        if summary.any_imported() {
            wait_for_operator()?;
        }
    }

    // Surface shutdown errors instead of discarding them in drop.
    client.close()?;
    outcome.map(|_| ())
}

/// Blocks until the operator acknowledges, keeping the UI reachable.
fn wait_for_operator() -> io::Result<()> {
    print!("Press <ENTER> to close");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}

//! dataset-bootstrap
//!
//! Initializes a named dataset in the configured store exactly once, and
//! inspects it afterwards.
//!
//! ```text
//! dataset-bootstrap [--config dataset.toml] init   [--target NAME]
//! dataset-bootstrap [--config dataset.toml] status [--target NAME]
//! dataset-bootstrap [--config dataset.toml] query  --attribute IDENT [--target NAME]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dataset_bootstrap::config::{load_config, AppConfig};
use dataset_bootstrap::lifecycle::startup::{bootstrap, coordinator_for, init_observability};
use dataset_bootstrap::store::{Query, QueryResult};
use dataset_bootstrap::{ClassifiedFailure, SetupRegistry};

#[derive(Parser)]
#[command(name = "dataset-bootstrap")]
#[command(about = "Idempotent dataset bootstrapper with retry/backoff", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, default_value = "dataset.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the dataset unless it already is
    Init {
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Report whether the dataset is initialized
    Status {
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Print every value of an attribute as JSON
    Query {
        #[arg(short, long)]
        attribute: String,

        #[arg(short, long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dataset-bootstrap failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    init_observability(&config.observability)?;

    tracing::info!(
        config = %cli.config.display(),
        store = %config.store.uri,
        "dataset-bootstrap v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let registry = SetupRegistry::builtin();

    match cli.command {
        Commands::Init { target } => {
            let target = target_or_default(&config, target);
            let status = bootstrap(&config, &registry, &target).await?;
            println!("{}: {}", target, status);
        }
        Commands::Status { target } => {
            let target = target_or_default(&config, target);
            let plan = registry.require(&target)?;
            let coordinator = coordinator_for(&config).await?;
            let conn = coordinator.connect(&target).await?;
            let initialized = coordinator.is_initialized(conn.as_ref(), &plan.marker).await?;
            println!(
                "{}: {}",
                target,
                if initialized { "initialized" } else { "uninitialized" }
            );
        }
        Commands::Query { attribute, target } => {
            let target = target_or_default(&config, target);
            let coordinator = coordinator_for(&config).await?;
            let conn = coordinator.connect(&target).await?;
            let snapshot = coordinator.snapshot(conn.as_ref()).await?;
            let result = snapshot
                .read(&Query::Values(attribute))
                .map_err(ClassifiedFailure::from)?;
            println!("{}", render_values(result)?);
        }
    }

    Ok(())
}

fn target_or_default(config: &AppConfig, target: Option<String>) -> String {
    target.unwrap_or_else(|| config.bootstrap.target.clone())
}

/// Pretty JSON array of the values in a `Values` result.
fn render_values(result: QueryResult) -> Result<String, Box<dyn std::error::Error>> {
    match result {
        QueryResult::Values(values) => {
            let rows: Vec<_> = values.into_iter().map(|(_, value)| value).collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        other => Err(format!("unexpected query result: {:?}", other).into()),
    }
}

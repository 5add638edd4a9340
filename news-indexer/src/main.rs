//! News Indexer
//!
//! Command line entry point: indexes a JSON Lines news dataset into Typesense
//! and manages the target collection.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use news_indexer::dataset::read_dataset;
use news_indexer::{Dependencies, IndexingError};
use news_indexer_pipeline::lifecycle::StdinPrompt;
use news_indexer_pipeline::loader::LoaderConfig;
use news_indexer_repository::{CollectionSchema, COLLECTION_NAME};
use news_indexer_shared::{IndexMode, IndexingStats};

#[derive(Parser)]
#[command(name = "news-indexer")]
#[command(about = "Index government news articles into Typesense", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a JSON Lines dataset into a collection
    Index {
        /// Path to the dataset (one JSON object per line)
        #[arg(long)]
        input: PathBuf,

        /// Target collection
        #[arg(long, default_value = COLLECTION_NAME)]
        collection: String,

        /// full: populate an empty collection; incremental: upsert into an existing one
        #[arg(long, default_value = "full")]
        mode: IndexMode,

        /// Allow a full run over a collection that already holds documents
        #[arg(long)]
        force: bool,

        /// Documents per import request
        #[arg(long, default_value = "1000")]
        batch_size: usize,

        /// Run the verification queries after a successful run
        #[arg(long)]
        verify: bool,
    },
    /// Create the collection if it does not exist
    Create {
        #[arg(long, default_value = COLLECTION_NAME)]
        collection: String,
    },
    /// List collections with their document counts
    List,
    /// Run read-only queries against a collection and log the results
    Verify {
        #[arg(long, default_value = COLLECTION_NAME)]
        collection: String,
    },
    /// Delete a collection. This cannot be undone
    Delete {
        #[arg(long)]
        collection: String,

        /// Skip the interactive confirmation
        #[arg(long)]
        confirm: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = tokio::select! {
        result = run(cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping");
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "News indexer failed");
            eprintln!("Error: {}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {}", err);
                source = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode, IndexingError> {
    let deps = Dependencies::from_env()?;
    deps.wait_for_engine().await?;

    match command {
        Commands::Index {
            input,
            collection,
            mode,
            force,
            batch_size,
            verify,
        } => {
            let records = read_dataset(&input)?;
            let orchestrator = deps.orchestrator(LoaderConfig {
                batch_size,
                mode,
                force,
            });

            match orchestrator.run(&collection, &records).await {
                Ok(stats) => {
                    print_stats(&stats)?;
                    if verify && !stats.skipped {
                        deps.verifier().verify(&collection).await;
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    if let Some(stats) = e.partial_stats() {
                        print_stats(stats)?;
                    }
                    Err(e.into())
                }
            }
        }
        Commands::Create { collection } => {
            let outcome = deps
                .manager()
                .ensure(&collection, &CollectionSchema::news())
                .await?;
            if outcome.created() {
                info!(collection = %collection, "Collection ready");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => {
            let collections = deps.manager().list().await;
            for info in &collections {
                println!("{}\t{}", info.name, info.num_documents);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { collection } => {
            let report = deps.verifier().verify(&collection).await;
            if !report.passed() {
                warn!(warnings = report.warnings, "Verification finished with warnings");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Delete {
            collection,
            confirm,
        } => {
            let outcome = deps
                .manager()
                .delete(&collection, confirm, &StdinPrompt)
                .await?;

            if outcome.deleted {
                info!(
                    collection = %collection,
                    attempts = outcome.attempts,
                    "Collection deletion complete"
                );
                Ok(ExitCode::SUCCESS)
            } else {
                error!(
                    collection = %collection,
                    existed = outcome.existed,
                    cancelled = outcome.cancelled,
                    attempts = outcome.attempts,
                    "Collection was not deleted"
                );
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn print_stats(stats: &IndexingStats) -> Result<(), IndexingError> {
    let rendered = serde_json::to_string_pretty(stats)
        .map_err(|e| IndexingError::dataset(format!("Cannot render statistics: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

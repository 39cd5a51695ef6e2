//! arXiv Digest CLI
//!
//! Local execution entry point, meant to be run once per day by an external
//! scheduler.

use std::path::PathBuf;

use arxiv_digest::{
    error::Result,
    models::Config,
    pipeline,
    services::ArxivClient,
    storage::LocalStorage,
};
use chrono::Local;
use clap::{Parser, Subcommand};

/// arxiv-digest - Daily arXiv listings by topic
#[derive(Parser, Debug)]
#[command(
    name = "arxiv-digest",
    version,
    about = "Keeps a deduplicated Markdown digest of arXiv papers per topic"
)]
struct Cli {
    /// Directory that store and document paths are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Configuration file (default: {root}/digest.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every topic, merge the results and re-render the documents
    Run,

    /// Re-render the documents from the stored papers only
    Render,

    /// Print the compiled search query of each topic
    Queries,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join("digest.toml"));
    let config = Config::load(&config_path)?;
    log::info!("Loaded configuration from {}", config_path.display());

    let storage = LocalStorage::new(&cli.root);
    let today = Local::now().date_naive();

    match cli.command {
        Command::Run => {
            let source = ArxivClient::new(&config.arxiv)?;
            let summary = pipeline::run_pipeline(&config, &source, &storage, today).await?;

            log::info!(
                "Fetched {} papers for {} topics, wrote {} documents",
                summary.records_fetched,
                summary.topics_fetched,
                summary.documents_written
            );
            if !summary.failed_topics.is_empty() {
                log::warn!("Failed topics: {}", summary.failed_topics.join(", "));
            }
        }

        Command::Render => {
            let summary = pipeline::run_render(&config, &storage, today).await?;
            log::info!("Rendered {} documents", summary.documents_written);
        }

        Command::Queries => {
            for query in config.compile_topics()? {
                println!("{}: {}", query.topic, query.query);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} topics, {} results per topic)",
                config.topics.len(),
                config.arxiv.max_results
            );
        }
    }

    log::info!("Done!");

    Ok(())
}

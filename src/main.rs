//! Article Harvester main entry point
//!
//! This is the command-line interface for the Article Harvester crawler.

use article_harvester::config::{load_config, validate, Config, ExtractStrategy};
use article_harvester::crawler::{run_paged, Coordinator, CrawlOutcome};
use article_harvester::output::print_statistics;
use article_harvester::storage;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Article Harvester: a bounded, polite article crawler
///
/// Starting from a seed URL, Article Harvester collects article titles,
/// links and dates, follows pagination and in-site links up to a maximum
/// depth, and writes everything it found to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "article-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A bounded, polite article crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed
    #[arg(short = 'd', long, value_name = "N")]
    max_depth: Option<u32>,

    /// Output JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// How records are recognized on a page
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Fetch pages 1..N of the seed listing instead of traversing links
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Stop the crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Articles,
    Anchors,
}

impl From<StrategyArg> for ExtractStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Articles => ExtractStrategy::Articles,
            StrategyArg::Anchors => ExtractStrategy::Anchors,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let outcome = match cli.pages {
        Some(pages) => run_paged(&config, &cli.seed_url, pages, cancel).await,
        None => handle_crawl(config.clone(), &cli.seed_url, cancel).await,
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_statistics(&outcome.stats);
    }

    save_records(Path::new(&config.output.path), &outcome)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_harvester=info,warn"),
            1 => EnvFilter::new("article_harvester=debug,info"),
            2 => EnvFilter::new("article_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and validates
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    if let Some(strategy) = cli.strategy {
        config.extract.strategy = strategy.into();
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.crawl_timeout_secs = timeout;
    }

    validate(&config)?;
    Ok(config)
}

/// Cancels the crawl on Ctrl-C; records collected so far are still saved
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the records collected so far");
            cancel.cancel();
        }
    });
}

/// Handles the traversal crawl
async fn handle_crawl(
    config: Config,
    seed_url: &str,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, article_harvester::HarvestError> {
    let coordinator = Coordinator::from_config(config)?;

    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        cancel.cancelled().await;
        token.cancel();
    });

    coordinator.run(seed_url).await
}

/// Writes the records, warning when there were none
fn save_records(path: &Path, outcome: &CrawlOutcome) -> Result<(), Box<dyn std::error::Error>> {
    if outcome.records.is_empty() {
        tracing::warn!("No articles found");
    }

    storage::save(path, &outcome.records)?;

    if outcome.records.is_empty() {
        println!("No articles found; wrote empty list to {}", path.display());
    } else {
        println!(
            "✓ Saved {} articles to {}",
            outcome.records.len(),
            path.display()
        );
    }

    Ok(())
}

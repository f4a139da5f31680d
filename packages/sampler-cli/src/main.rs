//! Balanced snowboard catalog sampler.
//!
//! Collects records into SQLite until the standard sampling matrix is
//! filled, then optionally enriches them from product pages.

mod config;
mod output;

use anyhow::{Context, Result};
use catalog_sampler::{
    collect, enrich, ClassificationMode, FetcherExt, FillRates, HttpFetcher, QuotaTracker,
    RecordStore, SqliteStore,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "sampler")]
#[command(about = "Balanced sampling of a snowboard catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect records until the sampling matrix is filled
    Run {
        /// Clear the store before collecting
        #[arg(long)]
        fresh: bool,

        /// Listing pages per category pass
        #[arg(long)]
        max_pages: Option<u32>,

        /// File records under the category being collected instead of
        /// classifying them by keyword
        #[arg(long)]
        target_mode: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch product pages for stored records and merge detail fields
    Enrich,

    /// Show progress against the matrix and field fill rates
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored record
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.verbose_logging);

    match cli.command {
        Commands::Run {
            fresh,
            max_pages,
            target_mode,
            json,
        } => cmd_run(&config, fresh, max_pages, target_mode, json).await,
        Commands::Enrich => cmd_enrich(&config).await,
        Commands::Status { json } => cmd_status(&config, json).await,
        Commands::Clear => cmd_clear(&config).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,catalog_sampler=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn connect(config: &Config) -> Result<SqliteStore> {
    SqliteStore::new(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            trigger.cancel();
        }
    });
    token
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_run(
    config: &Config,
    fresh: bool,
    max_pages: Option<u32>,
    target_mode: bool,
    json: bool,
) -> Result<()> {
    let mut sampler_config = config.sampler_config();
    if let Some(pages) = max_pages {
        sampler_config = sampler_config.with_max_pages(pages);
    }
    if target_mode {
        sampler_config = sampler_config.with_classification(ClassificationMode::Target);
    }
    sampler_config
        .validate()
        .context("Invalid sampler configuration")?;

    let store = connect(config).await?;
    if fresh {
        let removed = store.clear().await.context("Failed to clear store")?;
        if !json {
            println!("{} {} records", "Cleared".yellow(), removed);
        }
    }

    let fetcher = HttpFetcher::new(&sampler_config).context("Failed to build HTTP client")?;
    let cancel = cancel_on_ctrl_c();

    if !json {
        output::print_banner("Collecting catalog sample");
    }

    let rate_limit = sampler_config.requests_per_second;
    let report = match rate_limit {
        Some(rps) => collect(sampler_config, &fetcher.rate_limited(rps), &store, cancel).await,
        None => collect(sampler_config, &fetcher, &store, cancel).await,
    }
    .context("Collection failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }
    Ok(())
}

async fn cmd_enrich(config: &Config) -> Result<()> {
    let sampler_config = config.sampler_config();
    sampler_config
        .validate()
        .context("Invalid sampler configuration")?;

    let store = connect(config).await?;
    let fetcher = HttpFetcher::new(&sampler_config).context("Failed to build HTTP client")?;
    let cancel = cancel_on_ctrl_c();

    output::print_banner("Enriching stored records");

    let rate_limit = sampler_config.requests_per_second;
    let report = match rate_limit {
        Some(rps) => enrich(&store, &fetcher.rate_limited(rps), &sampler_config, &cancel).await,
        None => enrich(&store, &fetcher, &sampler_config, &cancel).await,
    }
    .context("Enrichment failed")?;

    output::print_enrichment(&report);
    Ok(())
}

async fn cmd_status(config: &Config, json: bool) -> Result<()> {
    let sampler_config = config.sampler_config();
    sampler_config
        .validate()
        .context("Invalid sampler configuration")?;

    let store = connect(config).await?;
    let progress = store.load_progress().await.context("Failed to load progress")?;

    let mut tracker =
        QuotaTracker::with_target_total(&sampler_config.matrix, sampler_config.effective_target());
    tracker.load_progress(&progress);
    let summary = tracker.completion_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let records = store.list().await.context("Failed to list records")?;
    output::print_banner("Sampling progress");
    output::print_progress(&summary);
    output::print_fill_rates(&FillRates::compute(&records));
    Ok(())
}

async fn cmd_clear(config: &Config) -> Result<()> {
    let store = connect(config).await?;
    let removed = store.clear().await.context("Failed to clear store")?;
    println!("{} {} records", "Cleared".yellow(), removed);
    Ok(())
}

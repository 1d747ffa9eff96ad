use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn};

use bookhound::config::AppConfig;
use bookhound::evaluator::DiscountEvaluator;
use bookhound::history::{JsonFileStore, PriceRecordStore};
use bookhound::notify;
use bookhound::sources;
use bookhound::tracker::PriceTracker;

#[derive(Parser)]
#[command(name = "bookhound", version, about = "Book price-drop tracker")]
struct Cli {
    /// Directory holding default/{RUN_MODE}/local config files
    #[arg(long, global = true, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every configured (book, store) pair once
    Check {
        /// Override the configured discount threshold (fraction, e.g. 0.15)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Print the persisted best-price records
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bookhound=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting Bookhound...");
    let config = AppConfig::from_dir(&cli.config_dir).context("loading configuration")?;

    match cli.command {
        Command::Check { threshold } => check(&config, threshold).await,
        Command::History => history(&config).await,
    }
}

async fn check(config: &AppConfig, threshold_override: Option<f64>) -> Result<()> {
    let threshold = match threshold_override {
        Some(value) => Decimal::try_from(value).context("invalid --threshold")?,
        None => config
            .tracker
            .threshold()
            .ok_or_else(|| anyhow!("configured discount threshold is not a valid decimal"))?,
    };
    let evaluator = DiscountEvaluator::new(threshold)?;

    let records = Arc::new(JsonFileStore::open(&config.tracker.history_path).await?);
    let client = sources::build_http_client(&config.fetcher)?;
    let registry = sources::build_sources(&config.catalog.stores, &client);
    let notifiers = notify::build_notifiers(&config.notifications);

    let tracker = PriceTracker::new(records, registry, evaluator)
        .with_max_concurrent_fetches(config.fetcher.max_concurrent_fetches)
        .with_fetch_retries(
            config.fetcher.retry_attempts,
            Duration::from_millis(config.fetcher.retry_delay_ms),
        );

    let catalog = config.catalog.pairs();
    let report = tracker.run(&catalog).await?;

    notify::dispatch(&notifiers, &report.events).await;

    if report.has_failures() {
        warn!(
            failures = report.failures.len(),
            "Some pairs could not be checked"
        );
    }
    info!(
        pairs = report.pairs_checked,
        updated = report.records_updated,
        events = report.events.len(),
        failures = report.failures.len(),
        "Run finished"
    );

    Ok(())
}

async fn history(config: &AppConfig) -> Result<()> {
    let records = JsonFileStore::open(&config.tracker.history_path).await?;
    let all = records.all().await?;

    if all.is_empty() {
        println!("No price history yet.");
        return Ok(());
    }

    for record in all {
        println!(
            "{} @ {}: best {} {} on {} (last checked {})",
            record.book_id,
            record.store_id,
            record.best_price,
            record.currency,
            record.best_price_at.format("%Y-%m-%d"),
            record.last_checked_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

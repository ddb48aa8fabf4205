//! Listing Crawler main entry point
//!
//! This is the command-line interface for the authenticated listings crawler.

use anyhow::Context;
use clap::Parser;
use listing_crawler::config::{
    load_file_config, validate, Config, Credentials, FileConfig, DEFAULT_OUTPUT_FILE,
};
use listing_crawler::crawler::run;
use listing_crawler::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit code for missing or invalid command-line input
const USAGE_EXIT_CODE: i32 = 2;

/// Listing Crawler: signs in and scrapes every result page of a category
///
/// Listings are written to a JSON file once all result pages have been
/// visited.
#[derive(Parser, Debug)]
#[command(name = "listing-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Authenticated, paginated listings crawler", long_about = None)]
struct Cli {
    /// Login for site authorization
    #[arg(long)]
    login: Option<String>,

    /// Password for site authorization
    #[arg(long)]
    password: Option<String>,

    /// Category to search in, relative to the site root
    #[arg(long)]
    category: Option<String>,

    /// File path to write scraping results to
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    file: PathBuf,

    /// Log level (0 = errors only, 1 = info, 2 = debug, 3 = trace)
    #[arg(long = "log-level", alias = "logLevel", default_value_t = 1)]
    log_level: u8,

    /// Optional TOML file overriding site endpoints, concurrency and selectors
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    tracing::info!("started scraping...");

    match run(config).await {
        Ok(report) => {
            tracing::info!(
                "finished scraping: {} records from {} pages in {:?}",
                report.records_saved,
                report.pages_visited,
                report.elapsed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scraping failed: {}", e);
            Err(e).context("scraping failed")
        }
    }
}

/// Sets up the logging/tracing subscriber based on the numeric log level
fn setup_logging(log_level: u8) {
    let filter = match log_level {
        0 => EnvFilter::new("error"),
        1 => EnvFilter::new("listing_crawler=info,warn"),
        2 => EnvFilter::new("listing_crawler=debug,info"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges command-line values with the optional site file and validates them
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading site configuration from: {}", path.display());
            load_file_config(path)?
        }
        None => FileConfig::default(),
    };

    let config = Config::new(
        Credentials::new(
            cli.login.clone().unwrap_or_default(),
            cli.password.clone().unwrap_or_default(),
        ),
        cli.category.clone().unwrap_or_default(),
        cli.file.clone(),
        file,
    );

    validate(&config)?;
    Ok(config)
}

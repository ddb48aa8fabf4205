//! Crawler module for the authenticated, paginated crawl
//!
//! This module contains the crawl-phase logic, including:
//! - Pagination frontier with at-most-once dispatch per result page
//! - HTML parsing, link extraction and listing extraction
//! - Overall crawl coordination

mod coordinator;
mod frontier;
mod parser;

pub use coordinator::{crawl, Coordinator, CrawlReport};
pub use frontier::Frontier;
pub use parser::{parse_page, ListingExtractor, ParsedPage};

use crate::auth::run_handshake;
use crate::config::Config;
use crate::output::{JsonFileSink, RecordSink};
use crate::session::{begin_crawl_phase, Session};
use crate::CrawlerError;
use std::sync::Arc;

/// Runs a complete scraping session
///
/// This is the main entry point. It will:
/// 1. Build a session for the configured site
/// 2. Sign in with the configured credentials
/// 3. Switch the session into the crawl phase
/// 4. Crawl the category's result pages
/// 5. Write all listings to the output file
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl and flush completed
/// * `Err(CrawlerError)` - A fatal error stopped the run
pub async fn run(config: Config) -> Result<CrawlReport, CrawlerError> {
    let session = Session::new(config.site.clone())?;

    tracing::info!("Signing in as {}", config.credentials.login);
    let authenticated = run_handshake(session, &config.credentials).await?;
    tracing::info!("Sign-in finished: {:?}", authenticated.outcome());

    let session = begin_crawl_phase(authenticated, &config.crawler);
    let sink: Arc<dyn RecordSink> = Arc::new(JsonFileSink::new(&config.output.file));

    crawl(session, &config.category, &config.selectors, sink).await
}

//! Crawler coordinator - crawl-phase orchestration
//!
//! This module runs the paginated crawl for one category:
//! - Seeding the work queue with the category's first result page
//! - Visiting pages concurrently, up to the session's limit
//! - Extracting listings into the sink and feeding links to the frontier
//! - Flushing the sink once the queue has drained

use crate::config::SelectorConfig;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{parse_page, ListingExtractor};
use crate::output::RecordSink;
use crate::session::{fetch_page, CrawlSession};
use crate::CrawlerError;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Summary of a finished crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    /// Wall-clock time from the seed visit to the end of the flush
    pub elapsed: Duration,
    /// Number of result pages fetched
    pub pages_visited: usize,
    /// Number of records written by the flush
    pub records_saved: usize,
}

/// A page waiting to be visited
#[derive(Debug, Clone)]
struct PageVisit {
    url: Url,
    referer: Option<Url>,
}

/// What one page visit produced
#[derive(Debug)]
struct PageOutcome {
    url: Url,
    discovered: Vec<Url>,
}

/// State shared by all in-flight page visits
struct PageContext {
    client: Client,
    frontier: Frontier,
    extractor: ListingExtractor,
    sink: Arc<dyn RecordSink>,
}

/// Main crawl-phase coordinator
pub struct Coordinator {
    seed: Url,
    max_concurrent_pages: usize,
    context: Arc<PageContext>,
}

impl Coordinator {
    /// Creates a coordinator for `category` on an authenticated session
    ///
    /// # Arguments
    ///
    /// * `session` - Crawl-phase session from `begin_crawl_phase`
    /// * `category` - Category path appended to the site's base URL
    /// * `selectors` - Listing selectors
    /// * `sink` - Destination for extracted records
    pub fn new(
        session: CrawlSession,
        category: &str,
        selectors: &SelectorConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, CrawlerError> {
        let seed = seed_url(&session.site().base_url, category)?;

        Ok(Self {
            seed,
            max_concurrent_pages: session.max_concurrent_pages(),
            context: Arc::new(PageContext {
                client: session.client().clone(),
                frontier: Frontier::new(category)?,
                extractor: ListingExtractor::new(selectors)?,
                sink,
            }),
        })
    }

    /// Runs the crawl until no page visits remain, then flushes the sink
    ///
    /// The first failed page visit aborts all others and is returned; the
    /// sink is not flushed in that case.
    pub async fn run(self) -> Result<CrawlReport, CrawlerError> {
        tracing::info!("Crawling result pages starting at {}", self.seed);
        let start = Instant::now();

        let mut pending = VecDeque::from([PageVisit {
            url: self.seed.clone(),
            referer: None,
        }]);
        let mut tasks = JoinSet::new();
        let mut pages_visited = 0;

        loop {
            while tasks.len() < self.max_concurrent_pages {
                let Some(visit) = pending.pop_front() else {
                    break;
                };
                tasks.spawn(visit_page(Arc::clone(&self.context), visit));
            }

            // Empty join set with nothing pending: the queue has drained
            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let outcome = joined??;
            pages_visited += 1;

            let referer = outcome.url;
            pending.extend(outcome.discovered.into_iter().map(|url| PageVisit {
                url,
                referer: Some(referer.clone()),
            }));
        }

        let sink = Arc::clone(&self.context.sink);
        let flushed = tokio::task::spawn_blocking(move || sink.flush()).await?;
        let elapsed = start.elapsed();
        tracing::info!("Finished products scraping in {:?}", elapsed);

        let records_saved = flushed?;
        tracing::info!(
            "Visited {} pages, saved {} records",
            pages_visited,
            records_saved
        );

        Ok(CrawlReport {
            elapsed,
            pages_visited,
            records_saved,
        })
    }
}

/// Fetches one page, hands its listings to the sink and returns the links
/// the frontier accepted
async fn visit_page(
    context: Arc<PageContext>,
    visit: PageVisit,
) -> Result<PageOutcome, CrawlerError> {
    let page = fetch_page(&context.client, &visit.url, visit.referer.as_ref()).await?;
    let parsed = parse_page(&page.body, &page.url, &context.extractor);

    for product in parsed.products {
        context.sink.save(product)?;
    }

    let discovered = parsed
        .links
        .iter()
        .filter_map(|link| context.frontier.discover(link))
        .collect();

    Ok(PageOutcome {
        url: page.url,
        discovered,
    })
}

/// Builds `<base>/<category>`
fn seed_url(base_url: &str, category: &str) -> Result<Url, CrawlerError> {
    let seed = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        category.trim_start_matches('/')
    );
    Ok(Url::parse(&seed)?)
}

/// Crawls every result page of `category` and persists the listings
///
/// # Example
///
/// ```no_run
/// use listing_crawler::config::{Credentials, CrawlerConfig, SelectorConfig, SiteConfig};
/// use listing_crawler::crawler::crawl;
/// use listing_crawler::output::JsonFileSink;
/// use listing_crawler::{begin_crawl_phase, run_handshake, Session};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::new(SiteConfig::default())?;
/// let credentials = Credentials::new("user@example.com", "secret");
/// let authenticated = run_handshake(session, &credentials).await?;
/// let session = begin_crawl_phase(authenticated, &CrawlerConfig::default());
///
/// let sink = Arc::new(JsonFileSink::new("./result.json"));
/// let report = crawl(session, "b/Widgets/12345", &SelectorConfig::default(), sink).await?;
/// println!("{} records in {:?}", report.records_saved, report.elapsed);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    session: CrawlSession,
    category: &str,
    selectors: &SelectorConfig,
    sink: Arc<dyn RecordSink>,
) -> Result<CrawlReport, CrawlerError> {
    Coordinator::new(session, category, selectors, sink)?
        .run()
        .await
}

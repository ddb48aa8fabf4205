//! Session handles shared by the handshake and crawl phases
//!
//! A [`Session`] owns the HTTP client and its cookie jar. The handshake
//! consumes it and produces an [`AuthenticatedSession`]; the crawl phase is
//! entered through [`begin_crawl_phase`], which yields a [`CrawlSession`]
//! over the same transport and cookies.

mod fetcher;
mod user_agent;

pub use fetcher::{build_http_client, fetch_page, submit_form, FetchedPage};
pub use user_agent::{random_user_agent, resolve_user_agent, BROWSER_USER_AGENTS};

use crate::auth::AuthenticatedSession;
use crate::config::{CrawlerConfig, SiteConfig};
use crate::CrawlerError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// An anonymous session: transport, cookie jar and site endpoints
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    jar: Arc<Jar>,
    site: Arc<SiteConfig>,
    user_agent: Arc<str>,
}

impl Session {
    /// Creates a session with an empty cookie jar
    ///
    /// The user agent is fixed for the session's lifetime: the configured
    /// one if set, otherwise a browser agent picked at random.
    pub fn new(site: SiteConfig) -> Result<Self, CrawlerError> {
        let user_agent = resolve_user_agent(site.user_agent.as_deref());
        tracing::debug!("Using user agent: {}", user_agent);

        let jar = Arc::new(Jar::default());
        let client = build_http_client(&user_agent, jar.clone())?;

        Ok(Self {
            client,
            jar,
            site: Arc::new(site),
            user_agent: Arc::from(user_agent),
        })
    }

    /// User agent sent with every request of this session
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Returns the `Cookie` header value the jar would send to `url`
    pub fn cookies_for(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }
}

/// Crawl-phase view of an authenticated session
///
/// Shares the client (and therefore the cookie jar) with the session the
/// handshake ran on, but carries none of the handshake's navigation logic.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    session: Session,
    max_concurrent_pages: usize,
}

impl CrawlSession {
    pub fn client(&self) -> &Client {
        self.session.client()
    }

    pub fn site(&self) -> &SiteConfig {
        self.session.site()
    }

    pub fn max_concurrent_pages(&self) -> usize {
        self.max_concurrent_pages
    }

    pub fn user_agent(&self) -> &str {
        self.session.user_agent()
    }

    pub fn cookies_for(&self, url: &Url) -> Option<String> {
        self.session.cookies_for(url)
    }
}

/// Switches an authenticated session into the concurrent crawl phase
pub fn begin_crawl_phase(
    authenticated: AuthenticatedSession,
    config: &CrawlerConfig,
) -> CrawlSession {
    let outcome = authenticated.outcome();
    let session = authenticated.into_session();
    tracing::debug!(
        "Entering crawl phase (login outcome: {:?}, max concurrent pages: {})",
        outcome,
        config.max_concurrent_pages
    );

    CrawlSession {
        session,
        max_concurrent_pages: config.max_concurrent_pages.max(1),
    }
}

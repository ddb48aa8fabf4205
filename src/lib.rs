//! Listing Crawler: an authenticated, paginated listings crawler
//!
//! This crate signs in to a commerce listings site by replaying its browser
//! login handshake, then walks the search-result pages of one category and
//! persists every listing it finds as a JSON array.

pub mod auth;
pub mod config;
pub mod crawler;
pub mod output;
pub mod product;
pub mod session;

use reqwest::{Method, StatusCode};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Sign-in handshake did not reach the login form after {steps} steps")]
    HandshakeStalled { steps: usize },

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} is mandatory and should be set")]
    MissingField(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Expected markup was not found in a page body
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("token '{name}' not found in page body")]
    MissingToken { name: &'static str },

    #[error("token '{name}' is malformed: {source}")]
    MalformedToken {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Network or HTTP-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned status {status}")]
    Status {
        method: Method,
        url: Url,
        status: StatusCode,
    },
}

impl TransportError {
    /// URL of the failed request (the final URL when the server answered)
    pub fn url(&self) -> &Url {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } => url,
        }
    }

    /// Returns the HTTP status code if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request { source, .. } => source.status(),
        }
    }

    /// Returns true if this is the anti-bot signal on the login endpoint:
    /// "method not allowed" on the sign-in submission path
    pub fn is_captcha_challenge(&self, submit_path: &str) -> bool {
        match self {
            Self::Status { url, status, .. } => {
                *status == StatusCode::METHOD_NOT_ALLOWED && url.path() == submit_path
            }
            Self::Request { .. } => false,
        }
    }
}

/// Failure while writing buffered records to their destination
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to create {}: {}", .path.display(), .source)]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to sync {} to disk: {}", .path.display(), .source)]
    Sync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use auth::{run_handshake, AuthenticatedSession, LoginOutcome};
pub use config::Config;
pub use crawler::{crawl, run, CrawlReport};
pub use product::Product;
pub use session::{begin_crawl_phase, CrawlSession, Session};

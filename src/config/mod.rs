//! Configuration module
//!
//! Credentials, category and output path come from the command line. Site
//! endpoints, crawl concurrency and listing selectors have defaults and can be
//! overridden with an optional TOML file.
//!
//! # Example
//!
//! ```no_run
//! use listing_crawler::config::load_file_config;
//! use std::path::Path;
//!
//! let file = load_file_config(Path::new("site.toml")).unwrap();
//! println!("Crawling {}", file.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, Credentials, FileConfig, OutputConfig, SelectorConfig, SiteConfig,
    DEFAULT_OUTPUT_FILE,
};

pub use parser::load_file_config;
pub use validation::validate;
pub(crate) use validation::validate_credentials;

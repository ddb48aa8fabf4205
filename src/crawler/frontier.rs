//! Pagination frontier
//!
//! Decides which discovered links become page visits. Links are keyed by
//! their `pgn=<n>` suffix; each key is dispatched at most once no matter how
//! many pages link to it or how many visits discover it concurrently.

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::{Position, Url};

/// Deduplicating frontier for one category's result pages
#[derive(Debug)]
pub struct Frontier {
    category: String,
    pagination: Regex,
    visited: Mutex<HashSet<String>>,
}

impl Frontier {
    /// Creates an empty frontier scoped to `category`
    pub fn new(category: impl Into<String>) -> Result<Self, regex::Error> {
        let category: String = category.into();
        Ok(Self {
            category: category.trim_start_matches('/').to_string(),
            pagination: Regex::new(r"pgn=\d+$")?,
            visited: Mutex::new(HashSet::new()),
        })
    }

    /// Returns the pagination key of `href`, if it ends with one
    pub fn page_key<'a>(&self, href: &'a str) -> Option<&'a str> {
        self.pagination.find(href).map(|m| m.as_str())
    }

    /// Records a discovered link and decides whether to visit it
    ///
    /// Returns the link when it belongs to the category, carries a pagination
    /// key, and that key has not been claimed yet. The check and the claim
    /// happen under one lock, so concurrent callers never both win the same
    /// key. A link rejected by the category filter does not claim its key.
    pub fn discover(&self, href: &str) -> Option<Url> {
        let key = self.page_key(href)?;
        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping unparseable link {}: {}", href, e);
                return None;
            }
        };
        if !self.in_category(&url) {
            return None;
        }

        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if !visited.insert(key.to_string()) {
            return None;
        }
        drop(visited);

        tracing::debug!("Discovered result page {} ({})", href, key);
        Some(url)
    }

    /// Category membership is decided on path and query only
    fn in_category(&self, url: &Url) -> bool {
        url[Position::BeforePath..Position::AfterQuery].contains(&self.category)
    }

    /// Number of pagination keys claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

//! HTML parser for search-result pages
//!
//! This module handles parsing result pages to extract:
//! - Links to follow (from `<a href>` tags)
//! - Listing records (title, image and the dynamic attribute rows)

use crate::config::SelectorConfig;
use crate::product::Product;
use crate::CrawlerError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Separator between key and value in an attribute row
const ATTRIBUTE_SEPARATOR: &str = ": ";

/// Extracted information from a result page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,

    /// Listings found on the page
    pub products: Vec<Product>,
}

/// Compiled selectors for listing extraction
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    listing: Selector,
    title: Selector,
    image: Selector,
    attribute_row: Selector,
}

impl ListingExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, CrawlerError> {
        Ok(Self {
            listing: compile(&config.listing)?,
            title: compile(&config.title)?,
            image: compile(&config.image)?,
            attribute_row: compile(&config.attribute_row)?,
        })
    }

    /// Extracts one record per listing node in `document`
    pub fn extract(&self, document: &Html) -> Vec<Product> {
        document
            .select(&self.listing)
            .map(|node| self.extract_listing(node))
            .collect()
    }

    fn extract_listing(&self, node: ElementRef<'_>) -> Product {
        let title = node
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let image_link = node
            .select(&self.image)
            .next()
            .and_then(|element| element.value().attr("src"))
            .unwrap_or_default()
            .to_string();

        let mut attributes = HashMap::new();
        for row in node.select(&self.attribute_row) {
            let text = row.text().collect::<String>();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match text.split_once(ATTRIBUTE_SEPARATOR) {
                Some((key, value)) => {
                    attributes.insert(key.to_string(), value.to_string());
                }
                None => {
                    tracing::warn!("Skipping attribute row without separator: {:?}", text);
                }
            }
        }

        Product {
            title,
            image_link,
            attributes,
        }
    }
}

fn compile(selector: &str) -> Result<Selector, CrawlerError> {
    Selector::parse(selector).map_err(|e| CrawlerError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Parses a result page and extracts links and listings
///
/// # Example
///
/// ```no_run
/// use listing_crawler::config::SelectorConfig;
/// use listing_crawler::crawler::{parse_page, ListingExtractor};
/// use url::Url;
///
/// let html = r#"<ul><li class="s-item"><h3 class="s-item__title">Widget</h3></li></ul>"#;
/// let base_url = Url::parse("https://www.ebay.com/b/Widgets").unwrap();
/// let extractor = ListingExtractor::new(&SelectorConfig::default()).unwrap();
/// let parsed = parse_page(html, &base_url, &extractor);
/// assert_eq!(parsed.products[0].title, "Widget");
/// ```
pub fn parse_page(html: &str, base_url: &Url, extractor: &ListingExtractor) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        products: extractor.extract(&document),
    }
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}

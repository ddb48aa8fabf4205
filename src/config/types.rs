use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www.ebay.com/";
pub const DEFAULT_SIGN_IN_URL: &str =
    "https://signin.ebay.com/ws/eBayISAPI.dll?SignIn&ru=https://www.ebay.com/";
pub const DEFAULT_SIGN_IN_SUBMIT_URL: &str = "https://www.ebay.com/signin/s";
pub const DEFAULT_MAX_CONCURRENT_PAGES: usize = 8;
pub const DEFAULT_OUTPUT_FILE: &str = "./result.json";

/// Fully resolved configuration for one crawl run
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub category: String,
    pub output: OutputConfig,
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub selectors: SelectorConfig,
}

impl Config {
    /// Combines command-line values with an optional site file
    pub fn new(
        credentials: Credentials,
        category: impl Into<String>,
        output_file: impl Into<PathBuf>,
        file: FileConfig,
    ) -> Self {
        Self {
            credentials,
            category: category.into(),
            output: OutputConfig {
                file: output_file.into(),
            },
            site: file.site,
            crawler: file.crawler,
            selectors: file.selectors,
        }
    }
}

/// Login credentials for the sign-in form
#[derive(Clone, Default)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Path of the JSON file the records are written to
    pub file: PathBuf,
}

/// Contents of the optional TOML site file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Endpoints of the target site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root; its path is the first handshake state
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Sign-in entry page that embeds the login tokens
    #[serde(rename = "sign-in-url", default = "default_sign_in_url")]
    pub sign_in_url: String,

    /// Endpoint the login form is posted to
    #[serde(rename = "sign-in-submit-url", default = "default_sign_in_submit_url")]
    pub sign_in_submit_url: String,

    /// User-Agent header sent with every request
    ///
    /// When unset, each session picks one of the built-in browser agents.
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sign_in_url: default_sign_in_url(),
            sign_in_submit_url: default_sign_in_submit_url(),
            user_agent: None,
        }
    }
}

/// Crawl-phase behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of page visits in flight at once
    #[serde(
        rename = "max-concurrent-pages",
        default = "default_max_concurrent_pages"
    )]
    pub max_concurrent_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages: DEFAULT_MAX_CONCURRENT_PAGES,
        }
    }
}

/// CSS selectors for listing extraction
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_listing_selector")]
    pub listing: String,

    #[serde(default = "default_title_selector")]
    pub title: String,

    #[serde(default = "default_image_selector")]
    pub image: String,

    #[serde(rename = "attribute-row", default = "default_attribute_row_selector")]
    pub attribute_row: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: default_listing_selector(),
            title: default_title_selector(),
            image: default_image_selector(),
            attribute_row: default_attribute_row_selector(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_sign_in_url() -> String {
    DEFAULT_SIGN_IN_URL.to_string()
}

fn default_sign_in_submit_url() -> String {
    DEFAULT_SIGN_IN_SUBMIT_URL.to_string()
}

fn default_max_concurrent_pages() -> usize {
    DEFAULT_MAX_CONCURRENT_PAGES
}

fn default_listing_selector() -> String {
    "li.s-item".to_string()
}

fn default_title_selector() -> String {
    "h3.s-item__title".to_string()
}

fn default_image_selector() -> String {
    "img.s-item__image-img".to_string()
}

fn default_attribute_row_selector() -> String {
    "span.s-item__dynamic".to_string()
}

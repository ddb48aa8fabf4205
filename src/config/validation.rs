use crate::config::types::{Config, CrawlerConfig, Credentials, SelectorConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
///
/// Required command-line values are checked first so a missing flag is
/// reported before anything else.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_credentials(&config.credentials)?;
    validate_category(&config.category)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates that login and password were supplied
pub(crate) fn validate_credentials(credentials: &Credentials) -> Result<(), ConfigError> {
    if credentials.login.is_empty() {
        return Err(ConfigError::MissingField("login"));
    }
    if credentials.password.is_empty() {
        return Err(ConfigError::MissingField("password"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ConfigError> {
    if category.trim().is_empty() {
        return Err(ConfigError::MissingField("category"));
    }
    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.file.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output file path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates site endpoints and the user agent
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;
    validate_http_url("sign-in-url", &config.sign_in_url)?;
    validate_http_url("sign-in-submit-url", &config.sign_in_submit_url)?;

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }
    Ok(())
}

fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("listing", &config.listing),
        ("title", &config.title),
        ("image", &config.image),
        ("attribute-row", &config.attribute_row),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {}", name, selector, e))
        })?;
    }
    Ok(())
}

/// Parses a URL and requires an http(s) scheme
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}

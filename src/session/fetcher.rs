//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for both crawl phases, including:
//! - Building the HTTP client around a shared cookie jar
//! - GET visits and form submissions with a `Referer` header
//! - Response logging
//! - Mapping error statuses to `TransportError`

use crate::TransportError;
use reqwest::cookie::Jar;
use reqwest::header::REFERER;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A response that arrived with a non-error status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Method of the request that produced this page
    pub method: Method,
    /// Final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client that stores cookies in `jar`
///
/// Every clone of the returned client shares the connection pool and the
/// jar, which is what carries the authenticated session into the crawl
/// phase.
///
/// # Example
///
/// ```no_run
/// use listing_crawler::session::build_http_client;
/// use reqwest::cookie::Jar;
/// use std::sync::Arc;
///
/// let client = build_http_client("Mozilla/5.0", Arc::new(Jar::default())).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, jar: Arc<Jar>) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .cookie_provider(jar)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Visits `url` with a GET request
///
/// Redirects are followed; the returned page carries the final URL, which
/// is what the handshake state machine keys on.
///
/// # Returns
///
/// * `Ok(FetchedPage)` - Status below 400
/// * `Err(TransportError)` - Network failure or error status
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    referer: Option<&Url>,
) -> Result<FetchedPage, TransportError> {
    let request = with_referer(client.get(url.clone()), referer);
    send(Method::GET, url, request).await
}

/// Submits `fields` as an urlencoded form POST to `url`
pub async fn submit_form(
    client: &Client,
    url: &Url,
    referer: Option<&Url>,
    fields: &[(&str, &str)],
) -> Result<FetchedPage, TransportError> {
    let request = with_referer(client.post(url.clone()).form(fields), referer);
    send(Method::POST, url, request).await
}

fn with_referer(request: RequestBuilder, referer: Option<&Url>) -> RequestBuilder {
    match referer {
        Some(referer) => request.header(REFERER, referer.as_str()),
        None => request,
    }
}

async fn send(
    method: Method,
    url: &Url,
    request: RequestBuilder,
) -> Result<FetchedPage, TransportError> {
    let response = request
        .send()
        .await
        .map_err(|source| TransportError::Request {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    let final_url = response.url().clone();
    log_response(&method, &final_url, status);

    if status.is_client_error() || status.is_server_error() {
        return Err(TransportError::Status {
            method,
            url: final_url,
            status,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| TransportError::Request {
            method: method.clone(),
            url: final_url.clone(),
            source,
        })?;

    Ok(FetchedPage {
        method,
        url: final_url,
        status,
        body,
    })
}

fn log_response(method: &Method, url: &Url, status: StatusCode) {
    let request_uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    tracing::debug!(
        "{}: {}{} -> {}",
        method,
        url.host_str().unwrap_or_default(),
        request_uri,
        status.as_u16()
    );
}

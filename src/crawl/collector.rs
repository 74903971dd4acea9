//! Page fetch and anchor extraction.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::CrawlError;
use crate::http_client::{HttpTimeouts, build_http_client};

/// Source of the hyperlinks found on a page.
///
/// Implemented by [`HtmlLinkCollector`] for real pages; tests supply
/// in-memory implementations.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the `href` of every anchor on the page, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] when the page cannot be fetched.
    async fn links_on_page(&self, page_url: &str) -> Result<Vec<String>, CrawlError>;
}

/// Fetches pages over HTTP and extracts anchor targets.
#[derive(Debug, Clone)]
pub struct HtmlLinkCollector {
    client: Client,
}

impl HtmlLinkCollector {
    /// Creates a collector with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Client`] when the HTTP client cannot be built.
    pub fn new() -> Result<Self, CrawlError> {
        Self::with_timeouts(HttpTimeouts::default())
    }

    /// Creates a collector with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Client`] when the HTTP client cannot be built.
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Result<Self, CrawlError> {
        let client = build_http_client(timeouts).map_err(|source| CrawlError::Client { source })?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, page_url: &str) -> Result<String, CrawlError> {
        let parsed = Url::parse(page_url).map_err(|_| CrawlError::invalid_url(page_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CrawlError::invalid_url(page_url));
        }

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::timeout(page_url)
            } else {
                CrawlError::network(page_url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::http_status(page_url, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| CrawlError::network(page_url, e))
    }
}

#[async_trait]
impl LinkSource for HtmlLinkCollector {
    #[instrument(skip(self), fields(url = %page_url))]
    async fn links_on_page(&self, page_url: &str) -> Result<Vec<String>, CrawlError> {
        let body = self.fetch_html(page_url).await?;
        let links = extract_anchor_hrefs(&body);
        debug!(count = links.len(), "links found on page");
        Ok(links)
    }
}

/// Returns the raw `href` value of every `<a>` element, in document order.
///
/// Anchors without an `href` attribute are skipped. Values are not resolved
/// against the page URL.
#[must_use]
pub fn extract_anchor_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(std::string::ToString::to_string)
        .collect()
}

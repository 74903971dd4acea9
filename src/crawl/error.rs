//! Error types for page crawling and link filtering.

use thiserror::Error;

/// Errors that can occur while fetching pages or compiling filters.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The page that failed to load.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The page that timed out.
        url: String,
    },

    /// The page answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The page that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The page address is not an absolute http(s) URL.
    #[error("invalid page URL: {url}")]
    InvalidUrl {
        /// The rejected address.
        url: String,
    },

    /// A configured filter is not a valid regular expression.
    #[error("invalid URL pattern filter '{pattern}': {source}\n  Suggestion: {suggestion}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// The regex compile error.
        #[source]
        source: regex::Error,
        /// How to rewrite the pattern.
        suggestion: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {source}")]
    Client {
        /// The reqwest builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl CrawlError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid pattern error, picking a suggestion from the
    /// compile error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        let suggestion = if source.to_string().contains("look-around") {
            LOOKAROUND_SUGGESTION
        } else {
            SYNTAX_SUGGESTION
        };
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
            suggestion,
        }
    }
}

/// Look-ahead/look-behind are not available; exclusions are written as
/// negated classes instead.
const LOOKAROUND_SUGGESTION: &str = "look-around such as (?!...) is not supported; \
     exclude links with a negated class instead, e.g. `[^#]*$` drops every link containing '#'";

const SYNTAX_SUGGESTION: &str =
    "filters use Rust regex syntax (https://docs.rs/regex) and are matched from the start of each link";

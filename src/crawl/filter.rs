//! Prefix-anchored link filtering and order-preserving deduplication.

use std::collections::HashSet;
use std::hash::Hash;

use regex::Regex;
use tracing::debug;

use super::CrawlError;

/// A compiled filter pattern.
///
/// The pattern must match from the start of the link but need not consume
/// all of it: `^https://a` keeps `https://a/b/1`, and `.*drive` keeps any link
/// containing `drive`.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    pattern: String,
    regex: Regex,
}

impl LinkFilter {
    /// Compiles `pattern` anchored at the start of the input.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidPattern`] when the pattern is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self, CrawlError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .map_err(|e| CrawlError::invalid_pattern(pattern, e))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Compiles a list of patterns, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first pattern that fails to compile.
    pub fn compile_all(patterns: &[String]) -> Result<Vec<Self>, CrawlError> {
        patterns.iter().map(|pattern| Self::new(pattern)).collect()
    }

    /// The pattern as configured (without the added anchor).
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true when the link matches from its start.
    #[must_use]
    pub fn is_match(&self, link: &str) -> bool {
        self.regex.is_match(link)
    }

    /// Keeps the matching links, preserving order.
    #[must_use]
    pub fn apply(&self, links: Vec<String>) -> Vec<String> {
        links.into_iter().filter(|link| self.is_match(link)).collect()
    }
}

/// Returns the subsequence of `links` matching `pattern` from its start.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidPattern`] when the pattern does not compile.
pub fn filter_links(links: &[String], pattern: &str) -> Result<Vec<String>, CrawlError> {
    let filter = LinkFilter::new(pattern)?;
    Ok(filter.apply(links.to_vec()))
}

/// Narrows `links` through every filter in order; a link must match all of them.
#[must_use]
pub fn apply_filters(links: Vec<String>, filters: &[LinkFilter]) -> Vec<String> {
    filters.iter().fold(links, |remaining, filter| {
        let before = remaining.len();
        let kept = filter.apply(remaining);
        debug!(
            pattern = filter.pattern(),
            before,
            after = kept.len(),
            "filter applied"
        );
        kept
    })
}

/// Removes duplicates, keeping each item at its first-seen position.
#[must_use]
pub fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

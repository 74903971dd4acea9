//! Page crawling: anchor collection and link filtering.
//!
//! - [`LinkSource`] - async trait returning the anchor targets of a page
//! - [`HtmlLinkCollector`] - HTTP + HTML implementation of [`LinkSource`]
//! - [`LinkFilter`] - prefix-anchored regular expression over links
//! - [`apply_filters`] - AND-composition of several filters
//! - [`dedup_preserving_order`] - first-seen deduplication

mod collector;
mod error;
mod filter;

pub use collector::{HtmlLinkCollector, LinkSource, extract_anchor_hrefs};
pub use error::CrawlError;
pub use filter::{LinkFilter, apply_filters, dedup_preserving_order, filter_links};

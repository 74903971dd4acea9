//! Error types for the discovery phase.

use thiserror::Error;

use crate::crawl::CrawlError;
use crate::drive::DriveError;

/// Errors that abort a discovery run.
///
/// Persistence failures are not here: they are reported through
/// [`super::DiscoveryOutcome::NotPersisted`] so the caller can still inspect
/// the identifiers that were resolved.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A page could not be fetched or a filter pattern is invalid.
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    /// Authentication or folder listing failed.
    #[error(transparent)]
    Drive(#[from] DriveError),
}

//! Drive Harvester Core Library
//!
//! This library finds Google Drive files referenced from a set of blog pages
//! and downloads them, resuming or skipping work already done.
//!
//! # Architecture
//!
//! The job runs in two phases:
//! - [`discovery`] - crawl pages, filter links, expand folders, persist the
//!   resolved identifier set (runs once per job)
//! - [`download`] - per-file skip/replace/download decision (runs every time)
//!
//! Supporting modules:
//! - [`crawl`] - page fetch, anchor extraction, prefix-anchored filters
//! - [`drive`] - Drive v3 REST client, authentication, link decomposition
//! - [`retry`] - re-authenticate-and-retry wrapper
//! - [`state`] - YAML job state and identifier index
//! - [`http_client`] - shared HTTP client construction

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod discovery;
pub mod download;
pub mod drive;
pub mod http_client;
pub mod retry;
pub mod state;
mod user_agent;

// Re-export commonly used types
pub use crawl::{CrawlError, HtmlLinkCollector, LinkFilter, LinkSource};
pub use discovery::{DRIVE_LINK_PATTERN, DiscoveryError, DiscoveryOrchestrator, DiscoveryOutcome};
pub use download::{
    DownloadError, DownloadOrchestrator, DownloadOutcome, DownloadSummary, FailurePolicy,
    LogProgress,
};
pub use drive::{
    Authenticator, DriveApi, DriveError, GoogleDriveClient, RefreshTokenAuthenticator, Session,
    StaticTokenAuthenticator, TransferProgress,
};
pub use retry::{DEFAULT_MAX_ATTEMPTS, ReauthPolicy, RetryDecision, with_reauth};
pub use state::{JobState, StateError, StateStore};

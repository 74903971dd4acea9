//! Remote storage provider access (Google Drive).
//!
//! # Architecture
//!
//! - [`Authenticator`] - mints a fresh [`Session`] on every call
//! - [`DriveApi`] - folder listing, metadata lookup and content download,
//!   each taking the session explicitly so callers can swap it after a
//!   failure
//! - [`GoogleDriveClient`] - Drive v3 REST implementation of [`DriveApi`]
//! - [`RefreshTokenAuthenticator`] / [`StaticTokenAuthenticator`] -
//!   [`Authenticator`] implementations
//! - [`list_files_in_folder`] - pagination-aware folder expansion
//! - [`parse_drive_link`] / [`partition_drive_links`] - share-link
//!   decomposition

mod auth;
mod client;
mod error;
mod folder;
mod links;

pub use auth::{
    AuthorizedUserCredentials, DEFAULT_TOKEN_URI, RefreshTokenAuthenticator,
    StaticTokenAuthenticator,
};
pub use client::{DEFAULT_API_BASE, GoogleDriveClient};
pub use error::{DriveError, LinkError};
pub use folder::list_files_in_folder;
pub use links::{DriveLink, PartitionedLinks, parse_drive_link, partition_drive_links};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

/// Largest page size the provider accepts for folder listings.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// An authenticated provider session.
///
/// Cheap to clone. The token is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: Arc<str>,
}

impl Session {
    /// Wraps a bearer access token.
    #[must_use]
    pub fn new(access_token: impl Into<Arc<str>>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// The bearer token to send with provider requests.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Remote metadata for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Provider file identifier.
    pub id: String,
    /// File name as reported by the provider.
    pub name: String,
    /// Authoritative size in bytes; absent for provider-native documents.
    pub size: Option<u64>,
}

/// One entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderEntry {
    /// Provider file identifier.
    pub id: String,
    /// File name.
    #[serde(default)]
    pub name: String,
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPage {
    /// Entries on this page, in provider order.
    pub files: Vec<FolderEntry>,
    /// Continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Receives per-chunk progress of a content download.
///
/// Used only for display; nothing in the pipeline depends on it.
pub trait TransferProgress: Send + Sync {
    /// A download of `file_name` is about to start.
    fn started(&self, _file_name: &str, _total_bytes: Option<u64>) {}

    /// `downloaded` bytes of `total` have been written so far.
    fn advanced(&self, downloaded: u64, total: Option<u64>);

    /// The current download ended (successfully or not).
    fn finished(&self) {}
}

/// Progress sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn advanced(&self, _downloaded: u64, _total: Option<u64>) {}
}

/// Produces provider sessions.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Acquires a new session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] when credentials are missing or rejected.
    async fn authenticate(&self) -> Result<Session, DriveError>;
}

/// Provider operations used by the pipeline.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Fetches one page of the files directly inside `folder_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] on transport, status or decoding failures.
    async fn list_folder_page(
        &self,
        session: &Session,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FolderPage, DriveError>;

    /// Looks up id, name and size of a file.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] on transport, status or decoding failures.
    async fn file_metadata(&self, session: &Session, file_id: &str)
    -> Result<FileMetadata, DriveError>;

    /// Streams the content of a file into `destination`, truncating it first.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] on transport, status or write failures. A
    /// partially written destination is removed.
    async fn download_file(
        &self,
        session: &Session,
        file_id: &str,
        destination: &Path,
        progress: &dyn TransferProgress,
    ) -> Result<u64, DriveError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("ya29.secret-token");
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret"), "token leaked: {debug}");
        assert_eq!(session.access_token(), "ya29.secret-token");
    }

    #[test]
    fn test_folder_entry_name_defaults_to_empty() {
        let entry: FolderEntry = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(entry.id, "abc");
        assert!(entry.name.is_empty());
    }
}

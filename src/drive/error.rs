//! Error types for the storage provider and Drive link decomposition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by provider calls (auth, listing, metadata, content).
#[derive(Debug, Error)]
pub enum DriveError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error calling {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout calling {url}")]
    Timeout {
        /// The endpoint that timed out.
        url: String,
    },

    /// The provider rejected the session (HTTP 401/403).
    #[error("[AUTH] provider rejected credentials (HTTP {status}) calling {url}")]
    Unauthorized {
        /// The endpoint that rejected the request.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status} calling {url}")]
    HttpStatus {
        /// The endpoint that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse {
        /// The endpoint whose response was rejected.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Session could not be obtained.
    #[error("[AUTH] authentication failed: {reason}\n  Suggestion: {suggestion}")]
    Auth {
        /// Why authentication failed.
        reason: String,
        /// How to fix it.
        suggestion: &'static str,
    },

    /// The credentials file is missing or unreadable.
    #[error("cannot load credentials from {path}: {reason}\n  Suggestion: {suggestion}")]
    Credentials {
        /// Credentials file path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
        /// How to produce a usable file.
        suggestion: &'static str,
    },

    /// The provider repeated a continuation token, so listing would never end.
    #[error("pagination stalled listing folder {folder_id}: token repeated")]
    PaginationStalled {
        /// Folder being listed.
        folder_id: String,
    },

    /// Writing streamed content to disk failed.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The destination file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {source}")]
    Client {
        /// The reqwest builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DriveError {
    /// Creates a network error, promoting timeouts to [`DriveError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Maps a non-success status to the matching variant.
    pub fn from_status(url: impl Into<String>, status: u16) -> Self {
        if matches!(status, 401 | 403) {
            Self::Unauthorized {
                url: url.into(),
                status,
            }
        } else {
            Self::HttpStatus {
                url: url.into(),
                status,
            }
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an authentication error.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
            suggestion: "Check the credentials file or set DRIVE_ACCESS_TOKEN to a valid token.",
        }
    }

    /// Creates a credentials-loading error.
    pub fn credentials(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self::Credentials {
            path: path.into(),
            reason: reason.into(),
            suggestion,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a provider-domain link could not be decomposed into an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The link is not a parseable absolute URL.
    #[error("unparseable Drive link: {link}")]
    Unparseable {
        /// The raw link.
        link: String,
    },

    /// The path is neither `/file/d/<id>` nor `.../folders/<id>`.
    #[error("Drive link is neither a file nor a folder link: {link}")]
    UnrecognizedShape {
        /// The raw link.
        link: String,
    },

    /// The identifier segment contains unexpected characters.
    #[error("Drive link has a malformed identifier '{id}': {link}")]
    InvalidIdentifier {
        /// The raw link.
        link: String,
        /// The rejected identifier segment.
        id: String,
    },
}

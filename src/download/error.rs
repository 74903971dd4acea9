//! Error types for the download phase.
//!
//! This module defines structured errors for the per-file decision procedure
//! and the batch orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use crate::drive::DriveError;
use crate::state::StateError;

/// Errors that can occur while materializing files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// A provider call failed (metadata, content, or re-authentication).
    #[error(transparent)]
    Drive(#[from] DriveError),

    /// The identifier index could not be loaded.
    #[error(transparent)]
    State(#[from] StateError),

    /// Local filesystem error (inspecting or preparing the destination).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The remote name cannot be used as a local file name.
    #[error("file {file_id} has an unusable name '{name}'")]
    InvalidFileName {
        /// Provider file identifier.
        file_id: String,
        /// The remote name as reported.
        name: String,
    },

    /// Downloaded size does not match the size the provider reported.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        /// Download path that failed verification.
        path: PathBuf,
        /// Expected size in bytes.
        expected_bytes: u64,
        /// Actual size in bytes.
        actual_bytes: u64,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid file name error.
    pub fn invalid_file_name(file_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::InvalidFileName {
            file_id: file_id.into(),
            name: name.into(),
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }
}

//! Error types for job state persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or saving the job config and index.
#[derive(Debug, Error)]
pub enum StateError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written or moved into place.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that failed to write.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid YAML for the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The in-memory value could not be serialized.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        /// Destination file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required field holds an unusable value.
    #[error("invalid config value for `{field}` in {path}: {reason}")]
    Invalid {
        /// Config file path.
        path: PathBuf,
        /// Offending key.
        field: &'static str,
        /// Why the value is rejected.
        reason: String,
    },
}

impl StateError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialize(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Serialize {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-value error.
    pub fn invalid(path: impl Into<PathBuf>, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Returns true when the underlying cause is a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

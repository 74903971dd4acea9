//! Per-file decision procedure: skip, replace a stale copy, or download.
//!
//! Completeness is never remembered: every run re-derives it by comparing
//! the local byte size with the size the provider reports.
//!
//! ```text
//! UNKNOWN --metadata--> ALREADY_COMPLETE | STALE_PARTIAL | ABSENT
//! STALE_PARTIAL --deleted--> ABSENT
//! ABSENT --downloaded--> COMPLETE
//! ```

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, instrument, warn};

use super::DownloadError;
use crate::drive::{DriveApi, Session, TransferProgress};

/// What is on disk at the destination, relative to the remote size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFileState {
    /// Nothing at the destination path.
    Absent,
    /// Local size equals remote size.
    Complete,
    /// Something is there but its size differs.
    Stale {
        /// Size of the local artifact in bytes.
        local_size: u64,
    },
}

/// Result of running the decision procedure for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The local copy already matched the remote size.
    AlreadyComplete {
        /// Local file name.
        name: String,
    },
    /// The file was downloaded.
    Downloaded {
        /// Local file name.
        name: String,
        /// Bytes written.
        bytes: u64,
        /// Whether a stale local copy was deleted first.
        replaced_stale: bool,
    },
    /// A stale local copy could not be removed, so the file was left alone.
    SkippedUndeletable {
        /// Local file name.
        name: String,
        /// The deletion error.
        reason: String,
    },
    /// The provider reports no size (native document), so completeness
    /// cannot be decided.
    SkippedUnknownSize {
        /// Remote file name.
        name: String,
    },
}

impl FileOutcome {
    /// Returns true when the local artifact is complete after this run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::AlreadyComplete { .. } | Self::Downloaded { .. })
    }
}

/// Compares the artifact at `path` with the remote size.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the path exists but cannot be
/// inspected.
pub async fn classify_local_file(
    path: &Path,
    remote_size: u64,
) -> Result<LocalFileState, DownloadError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() == remote_size && meta.is_file() => Ok(LocalFileState::Complete),
        Ok(meta) => Ok(LocalFileState::Stale {
            local_size: meta.len(),
        }),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(LocalFileState::Absent),
        Err(error) => Err(DownloadError::io(path, error)),
    }
}

/// Runs the decision procedure for `file_id` into `download_dir`.
///
/// # Errors
///
/// Returns [`DownloadError`] when a provider call fails, the remote name is
/// unusable, the destination cannot be inspected, or the downloaded size does
/// not match the remote size. A stale copy that cannot be deleted is not an
/// error; it yields [`FileOutcome::SkippedUndeletable`].
#[instrument(skip(api, session, download_dir, progress))]
pub async fn process_file(
    api: &dyn DriveApi,
    session: &Session,
    download_dir: &Path,
    file_id: &str,
    progress: &dyn TransferProgress,
) -> Result<FileOutcome, DownloadError> {
    let metadata = api.file_metadata(session, file_id).await?;
    let name = local_file_name(&metadata.name)
        .ok_or_else(|| DownloadError::invalid_file_name(file_id, &metadata.name))?;

    let Some(remote_size) = metadata.size else {
        warn!(name = %metadata.name, "Remote file has no size; cannot check completeness. Skipping.");
        return Ok(FileOutcome::SkippedUnknownSize {
            name: metadata.name,
        });
    };

    let path = download_dir.join(&name);
    let mut replaced_stale = false;

    match classify_local_file(&path, remote_size).await? {
        LocalFileState::Complete => {
            info!(name = %name, "Already downloaded. Skipping.");
            return Ok(FileOutcome::AlreadyComplete { name });
        }
        LocalFileState::Stale { local_size } => {
            warn!(
                name = %name,
                local_size,
                remote_size,
                "Previous incomplete download. Deleting."
            );
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(path = %path.display(), "Deleted"),
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Unable to delete. Skipping this file."
                    );
                    return Ok(FileOutcome::SkippedUndeletable {
                        name,
                        reason: error.to_string(),
                    });
                }
            }
            replaced_stale = true;
        }
        LocalFileState::Absent => {}
    }

    info!(name = %name, bytes = remote_size, "Starting download.");
    progress.started(&name, Some(remote_size));
    let result = api.download_file(session, file_id, &path, progress).await;
    progress.finished();
    let bytes = result?;

    if bytes != remote_size {
        return Err(DownloadError::integrity(path, remote_size, bytes));
    }

    info!(name = %name, bytes, "Download complete.");
    Ok(FileOutcome::Downloaded {
        name,
        bytes,
        replaced_stale,
    })
}

/// Turns a remote name into a single safe path component.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > | and control characters. Returns `None` for names that
/// would still resolve outside the directory (`.`, `..`, empty).
#[must_use]
pub fn local_file_name(remote_name: &str) -> Option<String> {
    let sanitized: String = remote_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_file_name_keeps_ordinary_names() {
        assert_eq!(local_file_name("Album 01.zip").unwrap(), "Album 01.zip");
    }

    #[test]
    fn test_local_file_name_replaces_separators() {
        assert_eq!(local_file_name("../etc/passwd").unwrap(), ".._etc_passwd");
        assert_eq!(local_file_name("a\\b:c").unwrap(), "a_b_c");
    }

    #[test]
    fn test_local_file_name_rejects_dot_names() {
        assert!(local_file_name("").is_none());
        assert!(local_file_name("  ").is_none());
        assert!(local_file_name(".").is_none());
        assert!(local_file_name("..").is_none());
    }

    #[tokio::test]
    async fn test_classify_absent() {
        let temp = TempDir::new().unwrap();
        let state = classify_local_file(&temp.path().join("missing.bin"), 10)
            .await
            .unwrap();
        assert_eq!(state, LocalFileState::Absent);
    }

    #[tokio::test]
    async fn test_classify_complete_and_stale() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.bin");
        std::fs::write(&path, vec![0_u8; 1024]).unwrap();

        assert_eq!(
            classify_local_file(&path, 1024).await.unwrap(),
            LocalFileState::Complete
        );
        assert_eq!(
            classify_local_file(&path, 2048).await.unwrap(),
            LocalFileState::Stale { local_size: 1024 }
        );
    }

    #[tokio::test]
    async fn test_classify_zero_byte_remote_with_empty_local_is_complete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(
            classify_local_file(&path, 0).await.unwrap(),
            LocalFileState::Complete
        );
    }

    #[test]
    fn test_outcome_is_complete() {
        assert!(FileOutcome::AlreadyComplete { name: "a".into() }.is_complete());
        assert!(!FileOutcome::SkippedUnknownSize { name: "a".into() }.is_complete());
    }
}

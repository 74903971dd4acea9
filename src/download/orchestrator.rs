//! Download phase: run the decision procedure for every resolved identifier.

use tracing::{error, info, instrument, warn};

use super::decision::{FileOutcome, process_file};
use super::DownloadError;
use crate::drive::{Authenticator, DriveApi, TransferProgress};
use crate::retry::{ReauthPolicy, with_reauth};
use crate::state::{JobState, StateStore};

/// What happens to the rest of the batch when a file fails after its retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the error; remaining identifiers are not attempted.
    #[default]
    Abort,
    /// Record the failure and move on to the next identifier.
    Continue,
}

/// An identifier whose decision procedure failed after all attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    /// Provider file identifier.
    pub file_id: String,
    /// Final error message.
    pub error: String,
}

/// Counts for one download phase run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Identifiers in the index.
    pub total: usize,
    /// Files downloaded this run (including replaced stale copies).
    pub downloaded: usize,
    /// Stale copies deleted and downloaded again.
    pub replaced: usize,
    /// Files whose local copy was already complete.
    pub already_complete: usize,
    /// Files left alone (undeletable stale copy or unknown remote size).
    pub skipped: usize,
    /// Files that failed (only populated with [`FailurePolicy::Continue`]).
    pub failed: Vec<FailedFile>,
}

impl DownloadSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::AlreadyComplete { .. } => self.already_complete += 1,
            FileOutcome::Downloaded { replaced_stale, .. } => {
                self.downloaded += 1;
                if *replaced_stale {
                    self.replaced += 1;
                }
            }
            FileOutcome::SkippedUndeletable { .. } | FileOutcome::SkippedUnknownSize { .. } => {
                self.skipped += 1;
            }
        }
    }

    /// Returns true when no file failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of invoking the download phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Discovery has not completed, so there is no index to work from.
    NotReady,
    /// Every identifier was processed.
    Finished(DownloadSummary),
}

/// Materializes the resolved identifier set into the download directory.
pub struct DownloadOrchestrator<'a> {
    api: &'a dyn DriveApi,
    auth: &'a dyn Authenticator,
    progress: &'a dyn TransferProgress,
    policy: ReauthPolicy,
    failure_policy: FailurePolicy,
}

impl<'a> DownloadOrchestrator<'a> {
    /// Creates an orchestrator with the default retry and failure policies.
    #[must_use]
    pub fn new(
        api: &'a dyn DriveApi,
        auth: &'a dyn Authenticator,
        progress: &'a dyn TransferProgress,
    ) -> Self {
        Self {
            api,
            auth,
            progress,
            policy: ReauthPolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Overrides the re-authentication retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: ReauthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides what happens after a file fails all attempts.
    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Runs the download phase.
    ///
    /// No-op unless `state.scraping_complete` is set. Otherwise loads the
    /// index, authenticates once, and processes every identifier in order,
    /// re-authenticating and retrying a failed identifier per the retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the index cannot be loaded, the
    /// download directory cannot be created, authentication fails, or (with
    /// [`FailurePolicy::Abort`]) a file fails all attempts.
    #[instrument(skip_all, fields(download_dir = %state.download_dir.display()))]
    pub async fn run(
        &self,
        state: &JobState,
        store: &StateStore,
    ) -> Result<DownloadOutcome, DownloadError> {
        if !state.scraping_complete {
            info!("Discovery has not completed; nothing to download yet");
            return Ok(DownloadOutcome::NotReady);
        }

        let file_ids = store.load_index().await?;
        let mut summary = DownloadSummary {
            total: file_ids.len(),
            ..DownloadSummary::default()
        };
        if file_ids.is_empty() {
            info!("Identifier index is empty; nothing to download");
            return Ok(DownloadOutcome::Finished(summary));
        }

        let download_dir = state.download_dir.as_path();
        tokio::fs::create_dir_all(download_dir)
            .await
            .map_err(|e| DownloadError::io(download_dir, e))?;

        let mut session = self.auth.authenticate().await?;
        info!(files = file_ids.len(), "Starting downloads");

        for (index, file_id) in file_ids.iter().enumerate() {
            info!(file_id = %file_id, position = index + 1, total = file_ids.len(), "Processing file");
            let result = with_reauth(&self.policy, self.auth, &mut session, |session| {
                let api = self.api;
                let progress = self.progress;
                async move { process_file(api, &session, download_dir, file_id, progress).await }
            })
            .await;

            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(err) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        error!(
                            file_id = %file_id,
                            error = %err,
                            remaining = file_ids.len() - index - 1,
                            "File failed after retry; aborting download phase"
                        );
                        return Err(err);
                    }
                    FailurePolicy::Continue => {
                        warn!(file_id = %file_id, error = %err, "File failed after retry; continuing");
                        summary.failed.push(FailedFile {
                            file_id: file_id.clone(),
                            error: err.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            total = summary.total,
            downloaded = summary.downloaded,
            replaced = summary.replaced,
            already_complete = summary.already_complete,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Download phase finished"
        );
        Ok(DownloadOutcome::Finished(summary))
    }
}

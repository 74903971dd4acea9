//! Download phase: materialize resolved identifiers as local files.
//!
//! This module decides, per identifier, whether the local copy is already
//! complete, stale, or absent, and downloads only what is needed. It re-runs
//! on every invocation and is the natural resume point of the job.
//!
//! # Features
//!
//! - Size-based completeness check (no checksums)
//! - Stale copies are deleted before re-downloading
//! - One re-authenticate-and-retry per identifier by default
//! - Abort-on-failure (default) or continue-on-failure batches
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::download::{DownloadOrchestrator, DownloadOutcome, LogProgress};
//! use harvester_core::drive::{GoogleDriveClient, StaticTokenAuthenticator};
//! use harvester_core::state::StateStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StateStore::in_dir("conf");
//! let state = store.load_state().await?;
//! let api = GoogleDriveClient::new()?;
//! let auth = StaticTokenAuthenticator::new("token");
//! let progress = LogProgress::new();
//!
//! let outcome = DownloadOrchestrator::new(&api, &auth, &progress)
//!     .run(&state, &store)
//!     .await?;
//! if let DownloadOutcome::Finished(summary) = outcome {
//!     println!("downloaded {}", summary.downloaded);
//! }
//! # Ok(())
//! # }
//! ```

mod decision;
mod error;
mod orchestrator;
mod progress;

pub use decision::{FileOutcome, LocalFileState, classify_local_file, local_file_name, process_file};
pub use error::DownloadError;
pub use orchestrator::{
    DownloadOrchestrator, DownloadOutcome, DownloadSummary, FailedFile, FailurePolicy,
};
pub use progress::LogProgress;

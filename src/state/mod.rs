//! Persisted job configuration and resolved identifier index.
//!
//! The job lives in two YAML files:
//!
//! - `config.yaml`: the [`JobState`] (seed pages, page filters, download
//!   directory and the `scraping_complete` flag)
//! - `index.yaml`: the resolved, duplicate-free list of file identifiers
//!
//! [`StateStore`] owns both paths. State is loaded once at process start and
//! passed explicitly to the discovery and download phases; every save returns
//! its outcome so callers decide what a failed write means.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::state::StateStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StateStore::in_dir("conf");
//! let state = store.load_state().await?;
//! println!("discovery complete: {}", state.scraping_complete);
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::StateError;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default index file name inside the config directory.
pub const INDEX_FILE_NAME: &str = "index.yaml";

/// Job configuration and discovery progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    /// Seed pages whose links form the blog page set.
    pub initial_blog_pages: Vec<String>,
    /// Prefix-anchored regular expressions; a page must match all of them.
    #[serde(default)]
    pub url_pattern_filters: Vec<String>,
    /// Directory that receives downloaded files.
    pub download_dir: PathBuf,
    /// Set once the resolved identifier index has been persisted.
    #[serde(default)]
    pub scraping_complete: bool,
}

impl JobState {
    /// Creates a fresh job with discovery not yet run.
    #[must_use]
    pub fn new(
        initial_blog_pages: Vec<String>,
        url_pattern_filters: Vec<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            initial_blog_pages,
            url_pattern_filters,
            download_dir: download_dir.into(),
            scraping_complete: false,
        }
    }
}

/// Location of the persisted job config and identifier index.
#[derive(Debug, Clone)]
pub struct StateStore {
    config_path: PathBuf,
    index_path: PathBuf,
}

impl StateStore {
    /// Creates a store with explicit file paths.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            index_path: index_path.into(),
        }
    }

    /// Creates a store using the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(CONFIG_FILE_NAME), dir.join(INDEX_FILE_NAME))
    }

    /// Path of the job config file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Path of the identifier index file.
    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Loads and validates the job config.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the file is missing, unreadable, not valid
    /// YAML, or has an empty `download_dir`.
    #[instrument(skip(self), fields(path = %self.config_path.display()))]
    pub async fn load_state(&self) -> Result<JobState, StateError> {
        let raw = read_file(&self.config_path).await?;
        let state: JobState = serde_yaml::from_str(&raw)
            .map_err(|e| StateError::parse(&self.config_path, e))?;
        if state.download_dir.as_os_str().is_empty() {
            return Err(StateError::invalid(
                &self.config_path,
                "download_dir",
                "must not be empty",
            ));
        }
        debug!(
            seeds = state.initial_blog_pages.len(),
            filters = state.url_pattern_filters.len(),
            scraping_complete = state.scraping_complete,
            "job config loaded"
        );
        Ok(state)
    }

    /// Writes the job config atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when serialization or the write fails; the
    /// previous file content is left untouched in that case.
    #[instrument(skip(self, state), fields(path = %self.config_path.display()))]
    pub async fn save_state(&self, state: &JobState) -> Result<(), StateError> {
        let yaml = serde_yaml::to_string(state)
            .map_err(|e| StateError::serialize(&self.config_path, e))?;
        write_atomic(&self.config_path, yaml.as_bytes()).await
    }

    /// Loads the resolved identifier index.
    ///
    /// An empty or `null` document is an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the file is missing, unreadable or not a
    /// YAML sequence of strings.
    #[instrument(skip(self), fields(path = %self.index_path.display()))]
    pub async fn load_index(&self) -> Result<Vec<String>, StateError> {
        let raw = read_file(&self.index_path).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let ids: Option<Vec<String>> =
            serde_yaml::from_str(&raw).map_err(|e| StateError::parse(&self.index_path, e))?;
        let ids = ids.unwrap_or_default();
        debug!(count = ids.len(), "identifier index loaded");
        Ok(ids)
    }

    /// Writes the resolved identifier index atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when serialization or the write fails.
    #[instrument(skip(self, ids), fields(path = %self.index_path.display(), count = ids.len()))]
    pub async fn save_index(&self, ids: &[String]) -> Result<(), StateError> {
        let yaml =
            serde_yaml::to_string(ids).map_err(|e| StateError::serialize(&self.index_path, e))?;
        write_atomic(&self.index_path, yaml.as_bytes()).await
    }
}

async fn read_file(path: &Path) -> Result<String, StateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StateError::read(path, e))
}

/// Writes to a sibling temp file, then renames it over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StateError> {
    let mut tmp_name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| StateError::write(&tmp_path, e))?;
    if let Err(error) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(StateError::write(path, error));
    }
    debug!(path = %path.display(), bytes = contents.len(), "state file written");
    Ok(())
}

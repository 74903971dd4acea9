//! In-memory collaborators shared by the integration tests.
//!
//! - [`FakeLinks`] - pages and the links found on them
//! - [`FakeDrive`] - folders, file metadata and content, with call counters
//!   and injectable download failures
//! - [`CountingAuth`] - mints `token-<n>` sessions and counts calls

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use harvester_core::crawl::{CrawlError, LinkSource};
use harvester_core::drive::{
    Authenticator, DriveApi, DriveError, FileMetadata, FolderEntry, FolderPage, Session,
    TransferProgress,
};
use tokio::io::AsyncWriteExt;

/// Link source backed by a page -> links map. Unknown pages return HTTP 404.
#[derive(Default)]
pub struct FakeLinks {
    pages: HashMap<String, Vec<String>>,
    failing: HashMap<String, u16>,
    pub fetches: AtomicUsize,
}

impl FakeLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            links.iter().map(|link| (*link).to_string()).collect(),
        );
        self
    }

    pub fn failing_page(mut self, url: &str, status: u16) -> Self {
        self.failing.insert(url.to_string(), status);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkSource for FakeLinks {
    async fn links_on_page(&self, page_url: &str) -> Result<Vec<String>, CrawlError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failing.get(page_url) {
            return Err(CrawlError::http_status(page_url, *status));
        }
        self.pages
            .get(page_url)
            .cloned()
            .ok_or_else(|| CrawlError::http_status(page_url, 404))
    }
}

struct FakeFile {
    name: String,
    size: Option<u64>,
    content: Vec<u8>,
}

/// Drive backed by in-memory folders and files.
#[derive(Default)]
pub struct FakeDrive {
    folders: HashMap<String, Vec<String>>,
    files: HashMap<String, FakeFile>,
    /// Remaining forced failures per file id (`usize::MAX` = always).
    download_failures: Mutex<HashMap<String, usize>>,
    pub list_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    /// Access token seen by each download call, in order.
    pub download_tokens: Mutex<Vec<String>>,
    /// Whether the destination already existed when each download started.
    destination_existed: Mutex<Vec<bool>>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, folder_id: &str, file_ids: &[&str]) -> Self {
        self.folders.insert(
            folder_id.to_string(),
            file_ids.iter().map(|id| (*id).to_string()).collect(),
        );
        self
    }

    /// Adds a file whose reported size matches its content.
    pub fn file(self, file_id: &str, name: &str, content: &[u8]) -> Self {
        let size = content.len() as u64;
        self.file_with_size(file_id, name, Some(size), content)
    }

    pub fn file_with_size(
        mut self,
        file_id: &str,
        name: &str,
        size: Option<u64>,
        content: &[u8],
    ) -> Self {
        self.files.insert(
            file_id.to_string(),
            FakeFile {
                name: name.to_string(),
                size,
                content: content.to_vec(),
            },
        );
        self
    }

    /// Makes the next `times` downloads of `file_id` fail with HTTP 503.
    pub fn failing_download(self, file_id: &str, times: usize) -> Self {
        self.download_failures
            .lock()
            .unwrap()
            .insert(file_id.to_string(), times);
        self
    }

    pub fn destination_existed(&self) -> Vec<bool> {
        self.destination_existed.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_count(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self, file_id: &str) -> bool {
        let mut failures = self.download_failures.lock().unwrap();
        match failures.get_mut(file_id) {
            Some(remaining) if *remaining > 0 => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DriveApi for FakeDrive {
    async fn list_folder_page(
        &self,
        _session: &Session,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FolderPage, DriveError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let ids = self
            .folders
            .get(folder_id)
            .ok_or_else(|| DriveError::from_status(format!("fake://folders/{folder_id}"), 404))?;

        let start: usize = page_token.map_or(0, |token| token.parse().unwrap());
        let end = (start + page_size as usize).min(ids.len());
        let files = ids[start..end]
            .iter()
            .map(|id| FolderEntry {
                id: id.clone(),
                name: format!("{id}.bin"),
            })
            .collect();
        let next_page_token = (end < ids.len()).then(|| end.to_string());
        Ok(FolderPage {
            files,
            next_page_token,
        })
    }

    async fn file_metadata(
        &self,
        _session: &Session,
        file_id: &str,
    ) -> Result<FileMetadata, DriveError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let file = self
            .files
            .get(file_id)
            .ok_or_else(|| DriveError::from_status(format!("fake://files/{file_id}"), 404))?;
        Ok(FileMetadata {
            id: file_id.to_string(),
            name: file.name.clone(),
            size: file.size,
        })
    }

    async fn download_file(
        &self,
        session: &Session,
        file_id: &str,
        destination: &Path,
        progress: &dyn TransferProgress,
    ) -> Result<u64, DriveError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.download_tokens
            .lock()
            .unwrap()
            .push(session.access_token().to_string());
        self.destination_existed
            .lock()
            .unwrap()
            .push(destination.exists());

        if self.take_failure(file_id) {
            return Err(DriveError::from_status(
                format!("fake://files/{file_id}?alt=media"),
                503,
            ));
        }

        let file = self
            .files
            .get(file_id)
            .ok_or_else(|| DriveError::from_status(format!("fake://files/{file_id}"), 404))?;
        // Append so stale bytes left at the destination show up in the result.
        let mut out = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .await
            .map_err(|e| DriveError::io(destination, e))?;
        out.write_all(&file.content)
            .await
            .map_err(|e| DriveError::io(destination, e))?;
        out.flush()
            .await
            .map_err(|e| DriveError::io(destination, e))?;
        let written = file.content.len() as u64;
        progress.advanced(written, file.size);
        Ok(written)
    }
}

/// Authenticator that counts calls and mints `token-1`, `token-2`, ...
#[derive(Default)]
pub struct CountingAuth {
    pub calls: AtomicUsize,
}

impl CountingAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for CountingAuth {
    async fn authenticate(&self) -> Result<Session, DriveError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Session::new(format!("token-{n}")))
    }
}

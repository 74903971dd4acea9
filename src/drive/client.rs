//! Drive v3 REST client.
//!
//! Implements [`DriveApi`] over plain HTTPS with bearer authorization:
//!
//! - listing: `GET {base}/files?q='<folder>' in parents&...`
//! - metadata: `GET {base}/files/<id>?fields=id,name,size`
//! - content: `GET {base}/files/<id>?alt=media`, streamed to disk

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::{
    DriveApi, DriveError, FileMetadata, FolderEntry, FolderPage, MAX_PAGE_SIZE, Session,
    TransferProgress,
};
use crate::http_client::{HttpTimeouts, build_http_client};

/// Production Drive v3 endpoint.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const LIST_FIELDS: &str = "nextPageToken, files(id, name)";
const METADATA_FIELDS: &str = "id,name,size";

/// HTTP client for the Drive v3 API.
///
/// Created once and reused; the session is supplied per call.
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FolderEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
    name: String,
    size: Option<String>,
}

impl GoogleDriveClient {
    /// Creates a client for the production API with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Client`] when the HTTP client cannot be built.
    pub fn new() -> Result<Self, DriveError> {
        Self::with_api_base(DEFAULT_API_BASE, HttpTimeouts::default())
    }

    /// Creates a client against a custom API base (e.g. a mock server).
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Client`] when the HTTP client cannot be built.
    pub fn with_api_base(
        api_base: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, DriveError> {
        let client = build_http_client(timeouts).map_err(|source| DriveError::Client { source })?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn files_url(&self, file_id: Option<&str>) -> Result<Url, DriveError> {
        let base = format!("{}/files", self.api_base);
        let mut url = Url::parse(&base)
            .map_err(|e| DriveError::invalid_response(&base, format!("bad API base: {e}")))?;
        if let Some(id) = file_id {
            url.path_segments_mut()
                .map_err(|()| DriveError::invalid_response(&base, "API base cannot have paths"))?
                .push(id);
        }
        Ok(url)
    }

    async fn get(&self, session: &Session, url: Url) -> Result<reqwest::Response, DriveError> {
        let endpoint = url.to_string();
        let response = self
            .client
            .get(url)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(|e| DriveError::network(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::from_status(endpoint, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    #[instrument(skip(self, session))]
    async fn list_folder_page(
        &self,
        session: &Session,
        folder_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FolderPage, DriveError> {
        let mut url = self.files_url(None)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", &format!("'{}' in parents", escape_query_literal(folder_id)))
                .append_pair("corpora", "allDrives")
                .append_pair("includeItemsFromAllDrives", "true")
                .append_pair("supportsAllDrives", "true")
                .append_pair("spaces", "drive")
                .append_pair("fields", LIST_FIELDS)
                .append_pair("pageSize", &page_size.min(MAX_PAGE_SIZE).to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        let endpoint = url.to_string();

        let response = self.get(session, url).await?;
        let body: FileListResponse = response
            .json()
            .await
            .map_err(|e| DriveError::invalid_response(&endpoint, e.to_string()))?;

        debug!(
            files = body.files.len(),
            has_next = body.next_page_token.is_some(),
            "folder page received"
        );
        Ok(FolderPage {
            files: body.files,
            next_page_token: body.next_page_token,
        })
    }

    #[instrument(skip(self, session))]
    async fn file_metadata(
        &self,
        session: &Session,
        file_id: &str,
    ) -> Result<FileMetadata, DriveError> {
        let mut url = self.files_url(Some(file_id))?;
        url.query_pairs_mut()
            .append_pair("fields", METADATA_FIELDS)
            .append_pair("supportsAllDrives", "true");
        let endpoint = url.to_string();

        let response = self.get(session, url).await?;
        let resource: FileResource = response
            .json()
            .await
            .map_err(|e| DriveError::invalid_response(&endpoint, e.to_string()))?;

        let size = resource
            .size
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    DriveError::invalid_response(&endpoint, format!("size '{raw}' is not a number"))
                })
            })
            .transpose()?;

        Ok(FileMetadata {
            id: resource.id,
            name: resource.name,
            size,
        })
    }

    #[instrument(skip(self, session, progress), fields(path = %destination.display()))]
    async fn download_file(
        &self,
        session: &Session,
        file_id: &str,
        destination: &Path,
        progress: &dyn TransferProgress,
    ) -> Result<u64, DriveError> {
        let mut url = self.files_url(Some(file_id))?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("supportsAllDrives", "true");
        let endpoint = url.to_string();

        let response = self.get(session, url).await?;
        let content_length = response.content_length();

        let mut file = File::create(destination)
            .await
            .map_err(|e| DriveError::io(destination, e))?;

        let stream_result =
            stream_to_file(&mut file, response, &endpoint, destination, content_length, progress)
                .await;

        if stream_result.is_err() {
            debug!(path = %destination.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(destination).await;
        }

        stream_result
    }
}

/// Streams the response body to `file`, reporting progress after each chunk.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    endpoint: &str,
    file_path: &Path,
    content_length: Option<u64>,
    progress: &dyn TransferProgress,
) -> Result<u64, DriveError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DriveError::network(endpoint, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DriveError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
        progress.advanced(bytes_written, content_length);
    }

    writer
        .flush()
        .await
        .map_err(|e| DriveError::io(file_path, e))?;

    Ok(bytes_written)
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_files_url_appends_identifier_segment() {
        let client =
            GoogleDriveClient::with_api_base("http://127.0.0.1:9/drive/v3/", HttpTimeouts::default())
                .unwrap();
        assert_eq!(
            client.files_url(Some("abc")).unwrap().as_str(),
            "http://127.0.0.1:9/drive/v3/files/abc"
        );
        assert_eq!(
            client.files_url(None).unwrap().as_str(),
            "http://127.0.0.1:9/drive/v3/files"
        );
    }

    #[test]
    fn test_escape_query_literal() {
        assert_eq!(escape_query_literal("plain"), "plain");
        assert_eq!(escape_query_literal("it's"), "it\\'s");
        assert_eq!(escape_query_literal("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_file_resource_size_is_optional() {
        let resource: FileResource =
            serde_json::from_str(r#"{"id":"x","name":"Doc"}"#).unwrap();
        assert!(resource.size.is_none());
    }

    #[test]
    fn test_file_list_response_camel_case() {
        let body: FileListResponse = serde_json::from_str(
            r#"{"nextPageToken":"tok","files":[{"id":"a","name":"a.pdf"}]}"#,
        )
        .unwrap();
        assert_eq!(body.next_page_token.as_deref(), Some("tok"));
        assert_eq!(body.files.len(), 1);
    }
}

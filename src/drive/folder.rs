//! Folder expansion across paginated listings.

use tracing::{debug, instrument};

use super::{DriveApi, DriveError, MAX_PAGE_SIZE, Session};

/// Returns the identifiers of every file directly inside `folder_id`.
///
/// Follows continuation tokens until the provider reports none (an empty
/// token counts as none). Nested folders are not descended into. Order is
/// the provider's.
///
/// # Errors
///
/// Returns the first [`DriveError`] from the provider, or
/// [`DriveError::PaginationStalled`] if a token is returned twice in a row.
#[instrument(skip(api, session))]
pub async fn list_files_in_folder(
    api: &dyn DriveApi,
    session: &Session,
    folder_id: &str,
) -> Result<Vec<String>, DriveError> {
    let mut file_ids = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0_usize;

    loop {
        let page = api
            .list_folder_page(session, folder_id, MAX_PAGE_SIZE, page_token.as_deref())
            .await?;
        pages += 1;
        file_ids.extend(page.files.into_iter().map(|entry| entry.id));

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                return Err(DriveError::PaginationStalled {
                    folder_id: folder_id.to_string(),
                });
            }
            Some(next) => page_token = Some(next),
            None => break,
        }
    }

    debug!(pages, files = file_ids.len(), "folder listing complete");
    Ok(file_ids)
}

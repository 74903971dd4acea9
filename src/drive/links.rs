//! Decomposition of Drive share links into file and folder identifiers.
//!
//! Two link shapes are recognized:
//!
//! - file: `https://drive.google.com/file/d/<id>/view`
//! - folder: `https://drive.google.com/drive/folders/<id>?usp=sharing`
//!   (also `/drive/u/<n>/folders/<id>`)
//!
//! The shape is validated before the identifier is taken, so a link that
//! does not conform is reported instead of yielding a garbage identifier.

use tracing::{debug, warn};
use url::Url;

use super::LinkError;

/// A provider link reduced to the identifier it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveLink {
    /// Link to a single file.
    File(String),
    /// Link to a folder that must be expanded into files.
    Folder(String),
}

/// Identifiers extracted from a batch of provider links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedLinks {
    /// File identifiers, in link order (duplicates kept).
    pub file_ids: Vec<String>,
    /// Folder identifiers, in link order (duplicates kept).
    pub folder_ids: Vec<String>,
    /// Links that matched neither shape.
    pub rejected: Vec<LinkError>,
}

/// Parses one provider link into a [`DriveLink`].
///
/// # Errors
///
/// Returns [`LinkError`] when the link is not a URL, has neither shape, or
/// carries an identifier with unexpected characters.
pub fn parse_drive_link(link: &str) -> Result<DriveLink, LinkError> {
    let parsed = Url::parse(link).map_err(|_| LinkError::Unparseable {
        link: link.to_string(),
    })?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    if let ["file", "d", id, ..] = segments.as_slice() {
        return validated(link, id).map(DriveLink::File);
    }

    if let Some(position) = segments.iter().position(|segment| *segment == "folders") {
        if let Some(id) = segments.get(position + 1) {
            return validated(link, id).map(DriveLink::Folder);
        }
    }

    Err(LinkError::UnrecognizedShape {
        link: link.to_string(),
    })
}

/// Splits provider links into file and folder identifiers.
///
/// Non-conforming links are logged at `warn` and collected in
/// [`PartitionedLinks::rejected`].
#[must_use]
pub fn partition_drive_links(links: &[String]) -> PartitionedLinks {
    let mut partitioned = PartitionedLinks::default();
    for link in links {
        match parse_drive_link(link) {
            Ok(DriveLink::File(id)) => {
                debug!(file_id = %id, "file link");
                partitioned.file_ids.push(id);
            }
            Ok(DriveLink::Folder(id)) => {
                debug!(folder_id = %id, "folder link");
                partitioned.folder_ids.push(id);
            }
            Err(error) => {
                warn!(error = %error, "Skipping malformed Drive link");
                partitioned.rejected.push(error);
            }
        }
    }
    partitioned
}

fn validated(link: &str, id: &str) -> Result<String, LinkError> {
    let well_formed = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if well_formed {
        Ok(id.to_string())
    } else {
        Err(LinkError::InvalidIdentifier {
            link: link.to_string(),
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_link_yields_file_identifier() {
        assert_eq!(
            parse_drive_link("https://drive.google.com/file/d/FID123/view").unwrap(),
            DriveLink::File("FID123".to_string())
        );
    }

    #[test]
    fn test_file_link_with_query_and_no_trailing_segment() {
        assert_eq!(
            parse_drive_link("https://drive.google.com/file/d/Ab-_9?usp=sharing").unwrap(),
            DriveLink::File("Ab-_9".to_string())
        );
    }

    #[test]
    fn test_folder_link_strips_query_string() {
        assert_eq!(
            parse_drive_link("https://drive.google.com/drive/folders/FOLD456?usp=sharing")
                .unwrap(),
            DriveLink::Folder("FOLD456".to_string())
        );
    }

    #[test]
    fn test_folder_link_with_user_index() {
        assert_eq!(
            parse_drive_link("https://drive.google.com/drive/u/0/folders/FOLD789").unwrap(),
            DriveLink::Folder("FOLD789".to_string())
        );
    }

    #[test]
    fn test_open_id_link_is_unrecognized() {
        assert!(matches!(
            parse_drive_link("https://drive.google.com/open?id=XYZ"),
            Err(LinkError::UnrecognizedShape { .. })
        ));
    }

    #[test]
    fn test_truncated_file_link_is_unrecognized() {
        assert!(matches!(
            parse_drive_link("https://drive.google.com/file/d/"),
            Err(LinkError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            parse_drive_link("https://drive.google.com/file/d"),
            Err(LinkError::UnrecognizedShape { .. })
        ));
    }

    #[test]
    fn test_folder_link_without_identifier_is_rejected() {
        assert!(parse_drive_link("https://drive.google.com/drive/folders").is_err());
        assert!(matches!(
            parse_drive_link("https://drive.google.com/drive/folders/"),
            Err(LinkError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_identifier_with_unexpected_characters_is_rejected() {
        assert!(matches!(
            parse_drive_link("https://drive.google.com/file/d/abc%20def/view"),
            Err(LinkError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_relative_link_is_unparseable() {
        assert!(matches!(
            parse_drive_link("drive.google.com/file/d/abc/view"),
            Err(LinkError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_partition_keeps_order_and_duplicates() {
        let links: Vec<String> = [
            "https://drive.google.com/file/d/F1/view",
            "https://drive.google.com/drive/folders/D1?usp=sharing",
            "https://drive.google.com/open?id=bad",
            "https://drive.google.com/file/d/F2/view",
            "https://drive.google.com/file/d/F1/view",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        let partitioned = partition_drive_links(&links);

        assert_eq!(partitioned.file_ids, vec!["F1", "F2", "F1"]);
        assert_eq!(partitioned.folder_ids, vec!["D1"]);
        assert_eq!(partitioned.rejected.len(), 1);
    }
}

//! Attachment operations for Confluence API.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use super::{ConfluenceClient, read_success};
use crate::error::ConfluenceError;
use crate::types::{AttachmentEntry, ResultList};

/// Page size used when listing attachments.
const ATTACHMENT_PAGE_SIZE: usize = 100;

/// Comment stored with every uploaded attachment.
const UPLOAD_COMMENT: &str = "Uploaded by confpub";

impl ConfluenceClient {
    /// List attachment filenames on a page.
    ///
    /// Follows pagination until the server returns a short page.
    pub fn list_attachments(&self, page_id: u64) -> Result<HashSet<String>, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);
        let limit = ATTACHMENT_PAGE_SIZE.to_string();
        let mut names = HashSet::new();
        let mut start = 0usize;

        debug!("Listing attachments for page {}", page_id);

        loop {
            let response = self
                .agent
                .get(&url)
                .query("start", start.to_string())
                .query("limit", &limit)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .call()?;

            let batch: ResultList<AttachmentEntry> = read_success(response)?.read_json()?;
            let count = batch.results.len();
            names.extend(batch.results.into_iter().map(|a| a.title));

            if count < ATTACHMENT_PAGE_SIZE {
                break;
            }
            start += count;
        }

        Ok(names)
    }

    /// Upload a local file as a new attachment on a page.
    ///
    /// The attachment is named after the file's basename.
    pub fn upload_attachment(&self, page_id: u64, path: &Path) -> Result<(), ConfluenceError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                )
            })?;
        let data = std::fs::read(path)?;
        let content_type = content_type_for(path);

        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!(
            "Uploading attachment '{}' ({} bytes) to page {}",
            filename,
            data.len(),
            page_id
        );

        // Build multipart form data manually
        let boundary = format!(
            "----ConfpubFormBoundary{:016x}",
            rand::random::<u64>()
        );
        let body = multipart_body(&boundary, &filename, content_type, &data, UPLOAD_COMMENT);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let created: ResultList<AttachmentEntry> = read_success(response)?.read_json()?;
        if created.results.is_empty() {
            return Err(ConfluenceError::EmptyResponse("attachment upload"));
        }
        Ok(())
    }
}

/// Assemble a `multipart/form-data` body with a file part and a comment part.
fn multipart_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
    comment: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
    body.extend_from_slice(comment.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Guess a MIME type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for(Path::new("a/diagram.png")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("arch.svg")), "image/svg+xml");
    }

    #[test]
    fn test_content_type_for_unknown_extension() {
        assert_eq!(
            content_type_for(Path::new("archive.drawio")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("Makefile")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_multipart_body_layout() {
        let body = multipart_body("XYZ", "a.png", "image/png", b"DATA", "hello");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with("--XYZ\r\n"));
        assert!(text.contains("name=\"file\"; filename=\"a.png\"\r\n"));
        assert!(text.contains("Content-Type: image/png\r\n\r\nDATA\r\n"));
        assert!(text.contains("name=\"comment\"\r\n\r\nhello\r\n"));
        assert!(text.ends_with("--XYZ--\r\n"));
    }
}

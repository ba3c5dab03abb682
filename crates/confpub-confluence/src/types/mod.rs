//! Confluence API types.

mod page;

use serde::Deserialize;

pub use page::{Page, RemotePageRef, Version};

/// One batch of a paginated listing (`/content`, `/child/attachment`).
///
/// Serde ignores the pagination links; callers page with `start`/`limit`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultList<T> {
    /// Items in this batch.
    pub results: Vec<T>,
}

/// Attachment entry; its title is the filename.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentEntry {
    /// Attachment filename.
    pub title: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_attachment_listing_keeps_titles() {
        let json = r#"{
            "results": [
                {"id": "att1", "type": "attachment", "title": "diagram.png"},
                {"id": "att2", "type": "attachment", "title": "logo.svg"}
            ],
            "start": 0, "limit": 100, "size": 2,
            "_links": {"base": "https://wiki.example.com"}
        }"#;

        let list: ResultList<AttachmentEntry> = serde_json::from_str(json).unwrap();

        let titles: Vec<_> = list.results.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["diagram.png", "logo.svg"]);
    }
}

//! Page operations for Confluence API.

use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, read_success};
use crate::error::ConfluenceError;
use crate::types::{Page, RemotePageRef, ResultList};

impl ConfluenceClient {
    /// Find a page by exact title within a space.
    ///
    /// Returns `Ok(None)` when the search succeeds but nothing matches.
    pub fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        debug!("Looking up page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .query("spaceKey", space_key)
            .query("title", title)
            .query("expand", "version")
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let search: ResultList<Page> = read_success(response)?.read_json()?;
        Ok(search.results.into_iter().next())
    }

    /// Get page by ID with its current version.
    pub fn get_page(&self, page_id: u64) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        debug!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .query("expand", "version")
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        Ok(read_success(response)?.read_json()?)
    }

    /// Create a new page, optionally as a child of `parent_id`.
    pub fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> Result<RemotePageRef, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        if let Some(parent) = parent_id {
            payload["ancestors"] = json!([{"id": parent.to_string()}]);
        }

        info!("Creating page '{}' in space {}", title, space_key);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_success(response)?.read_json()?;
        RemotePageRef::try_from(&page)
    }

    /// Update existing page (sends `version + 1`).
    ///
    /// Returns the new version number. A stale `version` makes the server
    /// reject the update with 409.
    pub fn update_page(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        version: u32,
    ) -> Result<u32, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        let payload = json!({
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version + 1}
        });

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_success(response)?.read_json()?;
        Ok(page.version.map_or(version + 1, |v| v.number))
    }
}

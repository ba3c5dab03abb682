//! Page store abstraction.
//!
//! [`PageStore`] is the narrow set of remote operations the publisher needs.
//! [`ConfluenceClient`] implements it against the REST API; `MockPageStore`
//! (behind the `mock` feature) implements it in memory for tests.

use std::collections::HashSet;
use std::path::Path;

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::RemotePageRef;

/// Remote page operations.
///
/// Every method issues at most one logical remote call and fails with
/// [`ConfluenceError`] on a non-success response. Callers decide whether to
/// abort or log and continue.
pub trait PageStore {
    /// Find a page by exact title within a space.
    fn find_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<RemotePageRef>, ConfluenceError>;

    /// Create a page, optionally as a child of `parent_id`.
    fn create(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> Result<RemotePageRef, ConfluenceError>;

    /// Fetch the current version number of a page.
    fn current_version(&self, page_id: u64) -> Result<u32, ConfluenceError>;

    /// Replace page content, sending `expected_version + 1`.
    ///
    /// Returns the new version number.
    fn update(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        expected_version: u32,
    ) -> Result<u32, ConfluenceError>;

    /// List attachment filenames on a page.
    fn list_attachments(&self, page_id: u64) -> Result<HashSet<String>, ConfluenceError>;

    /// Upload a local file as an attachment named after its basename.
    fn upload_attachment(&self, page_id: u64, local_path: &Path) -> Result<(), ConfluenceError>;
}

impl PageStore for ConfluenceClient {
    fn find_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<RemotePageRef>, ConfluenceError> {
        self.find_page_by_title(space_key, title)?
            .as_ref()
            .map(RemotePageRef::try_from)
            .transpose()
    }

    fn create(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> Result<RemotePageRef, ConfluenceError> {
        self.create_page(space_key, title, body, parent_id)
    }

    fn current_version(&self, page_id: u64) -> Result<u32, ConfluenceError> {
        let page = self.get_page(page_id)?;
        page.version
            .map(|v| v.number)
            .ok_or(ConfluenceError::EmptyResponse("page version"))
    }

    fn update(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        expected_version: u32,
    ) -> Result<u32, ConfluenceError> {
        self.update_page(page_id, title, body, expected_version)
    }

    fn list_attachments(&self, page_id: u64) -> Result<HashSet<String>, ConfluenceError> {
        ConfluenceClient::list_attachments(self, page_id)
    }

    fn upload_attachment(&self, page_id: u64, local_path: &Path) -> Result<(), ConfluenceError> {
        ConfluenceClient::upload_attachment(self, page_id, local_path)
    }
}

impl<S: PageStore + ?Sized> PageStore for &S {
    fn find_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<RemotePageRef>, ConfluenceError> {
        (**self).find_by_title(space_key, title)
    }

    fn create(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> Result<RemotePageRef, ConfluenceError> {
        (**self).create(space_key, title, body, parent_id)
    }

    fn current_version(&self, page_id: u64) -> Result<u32, ConfluenceError> {
        (**self).current_version(page_id)
    }

    fn update(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        expected_version: u32,
    ) -> Result<u32, ConfluenceError> {
        (**self).update(page_id, title, body, expected_version)
    }

    fn list_attachments(&self, page_id: u64) -> Result<HashSet<String>, ConfluenceError> {
        (**self).list_attachments(page_id)
    }

    fn upload_attachment(&self, page_id: u64, local_path: &Path) -> Result<(), ConfluenceError> {
        (**self).upload_attachment(page_id, local_path)
    }
}

//! Mock page store for testing.
//!
//! Provides [`MockPageStore`] for unit testing without a Confluence server.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;

use crate::error::ConfluenceError;
use crate::store::PageStore;
use crate::types::RemotePageRef;

/// First id handed out by the mock.
const FIRST_PAGE_ID: u64 = 1000;

/// A page held by [`MockPageStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    /// Page id.
    pub id: u64,
    /// Space key.
    pub space_key: String,
    /// Title.
    pub title: String,
    /// Parent page id.
    pub parent_id: Option<u64>,
    /// Storage-format body.
    pub body: String,
    /// Current version.
    pub version: u32,
}

/// In-memory page store for testing.
///
/// Use the builder methods to seed pages and inject failures.
///
/// # Example
///
/// ```ignore
/// use confpub_confluence::{MockPageStore, PageStore};
///
/// let store = MockPageStore::new().with_page("DOCS", "Docs-Install", None);
/// let found = store.find_by_title("DOCS", "Docs-Install").unwrap();
/// assert!(found.is_some());
/// ```
#[derive(Debug)]
pub struct MockPageStore {
    pages: RwLock<Vec<MockPage>>,
    attachments: RwLock<HashMap<u64, Vec<String>>>,
    failing_creates: RwLock<HashSet<String>>,
    failing_lookups: RwLock<HashSet<String>>,
    failing_uploads: RwLock<HashSet<String>>,
    next_id: RwLock<u64>,
}

impl Default for MockPageStore {
    fn default() -> Self {
        Self {
            pages: RwLock::new(Vec::new()),
            attachments: RwLock::new(HashMap::new()),
            failing_creates: RwLock::new(HashSet::new()),
            failing_lookups: RwLock::new(HashSet::new()),
            failing_uploads: RwLock::new(HashSet::new()),
            next_id: RwLock::new(FIRST_PAGE_ID),
        }
    }
}

impl MockPageStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, space_key: &str, title: &str, parent_id: Option<u64>) -> Self {
        self.insert_page(space_key, title, "", parent_id);
        self
    }

    /// Seed an existing attachment on a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment(self, page_id: u64, filename: &str) -> Self {
        self.attachments
            .write()
            .unwrap()
            .entry(page_id)
            .or_default()
            .push(filename.to_owned());
        self
    }

    /// Make page creation fail for a title.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_create_failure(self, title: &str) -> Self {
        self.failing_creates.write().unwrap().insert(title.to_owned());
        self
    }

    /// Make title lookup fail for a title.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_lookup_failure(self, title: &str) -> Self {
        self.failing_lookups.write().unwrap().insert(title.to_owned());
        self
    }

    /// Make uploads of a filename fail (as with a size limit).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_upload_failure(self, filename: &str) -> Self {
        self.failing_uploads
            .write()
            .unwrap()
            .insert(filename.to_owned());
        self
    }

    /// Snapshot of all pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn pages(&self) -> Vec<MockPage> {
        self.pages.read().unwrap().clone()
    }

    /// Find a page by title in any space.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn page_titled(&self, title: &str) -> Option<MockPage> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.title == title)
            .cloned()
    }

    /// Attachment filenames on a page, in upload order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn attachments_of(&self, page_id: u64) -> Vec<String> {
        self.attachments
            .read()
            .unwrap()
            .get(&page_id)
            .cloned()
            .unwrap_or_default()
    }

    fn insert_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> RemotePageRef {
        let mut next_id = self.next_id.write().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.pages.write().unwrap().push(MockPage {
            id,
            space_key: space_key.to_owned(),
            title: title.to_owned(),
            parent_id,
            body: body.to_owned(),
            version: 1,
        });
        RemotePageRef::new(id, title)
    }

    fn not_found(page_id: u64) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            status: 404,
            body: format!("page {page_id} not found"),
        }
    }
}

impl PageStore for MockPageStore {
    fn find_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<RemotePageRef>, ConfluenceError> {
        if self.failing_lookups.read().unwrap().contains(title) {
            return Err(ConfluenceError::HttpResponse {
                status: 500,
                body: "lookup failed".to_owned(),
            });
        }
        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.space_key == space_key && p.title == title)
            .map(|p| RemotePageRef::new(p.id, p.title.clone())))
    }

    fn create(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<u64>,
    ) -> Result<RemotePageRef, ConfluenceError> {
        if self.failing_creates.read().unwrap().contains(title) {
            return Err(ConfluenceError::HttpResponse {
                status: 403,
                body: "not permitted".to_owned(),
            });
        }
        // Ids below FIRST_PAGE_ID stand for pages that exist outside the mock.
        if let Some(parent) = parent_id
            && parent >= FIRST_PAGE_ID
            && !self.pages.read().unwrap().iter().any(|p| p.id == parent)
        {
            return Err(Self::not_found(parent));
        }
        Ok(self.insert_page(space_key, title, body, parent_id))
    }

    fn current_version(&self, page_id: u64) -> Result<u32, ConfluenceError> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == page_id)
            .map(|p| p.version)
            .ok_or_else(|| Self::not_found(page_id))
    }

    fn update(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        expected_version: u32,
    ) -> Result<u32, ConfluenceError> {
        let mut pages = self.pages.write().unwrap();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| Self::not_found(page_id))?;
        if page.version != expected_version {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!(
                    "version conflict: current {}, got {}",
                    page.version,
                    expected_version + 1
                ),
            });
        }
        page.title = title.to_owned();
        page.body = body.to_owned();
        page.version = expected_version + 1;
        Ok(page.version)
    }

    fn list_attachments(&self, page_id: u64) -> Result<HashSet<String>, ConfluenceError> {
        Ok(self.attachments_of(page_id).into_iter().collect())
    }

    fn upload_attachment(&self, page_id: u64, local_path: &Path) -> Result<(), ConfluenceError> {
        let filename = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_uploads.read().unwrap().contains(&filename) {
            return Err(ConfluenceError::HttpResponse {
                status: 413,
                body: "attachment too large".to_owned(),
            });
        }
        if !local_path.exists() {
            return Err(ConfluenceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                local_path.display().to_string(),
            )));
        }
        self.attachments
            .write()
            .unwrap()
            .entry(page_id)
            .or_default()
            .push(filename);
        Ok(())
    }
}

//! Confluence page types.

use std::fmt;

use serde::Deserialize;

use crate::error::ConfluenceError;

/// Confluence page as returned by the content API.
///
/// Only includes fields that are actually used.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID (numeric, sent as a string).
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information (present when `expand=version` was requested).
    #[serde(default)]
    pub version: Option<Version>,
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Identity of a page known to exist remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePageRef {
    /// Numeric page id.
    pub id: u64,
    /// Full destination title (prefix included).
    pub title: String,
}

impl RemotePageRef {
    /// Create a page reference.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

impl fmt::Display for RemotePageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id={})", self.title, self.id)
    }
}

impl TryFrom<&Page> for RemotePageRef {
    type Error = ConfluenceError;

    fn try_from(page: &Page) -> Result<Self, Self::Error> {
        let id = page
            .id
            .parse()
            .map_err(|_| ConfluenceError::InvalidPageId(page.id.clone()))?;
        Ok(Self::new(id, page.title.clone()))
    }
}

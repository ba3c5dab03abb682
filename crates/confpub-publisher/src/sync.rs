//! Page-tree synchronization.
//!
//! Mirrors the site navigation into Confluence before any content is pushed.
//! Every node gets a page titled `prefix + node title` under its parent's
//! page: existing pages are reused by title, missing ones are created with
//! a stub body. Content is filled in later, page by page.

use std::collections::HashMap;

use confpub_confluence::{PageStore, RemotePageRef};
use confpub_site::{LeafPage, NavigationNode};
use tracing::{debug, error, info, warn};

/// Local source path (docs-relative) → remote page.
pub type PathToPageMap = HashMap<String, RemotePageRef>;

/// Body of a section page: lists its children.
pub const SECTION_BODY: &str = r#"<ac:structured-macro ac:name="children" />"#;

/// Body of a newly created leaf page until its content is pushed.
pub const LEAF_PLACEHOLDER_BODY: &str =
    "<p>This page will be updated with content from MkDocs.</p>";

/// Two source files that resolved to the same remote page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCollision {
    /// The shared remote page.
    pub page: RemotePageRef,
    /// Source path that owns the page.
    pub kept: String,
    /// Source path left unmapped.
    pub skipped: String,
}

/// Result of one synchronization run.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Leaf source path → remote page.
    pub pages: PathToPageMap,
    /// Pages created.
    pub created: usize,
    /// Existing pages reused.
    pub reused: usize,
    /// Nodes skipped (with their subtrees) after a remote error.
    pub failed: usize,
    /// Leaves whose title was already taken by another leaf.
    pub collisions: Vec<TitleCollision>,
}

/// Walks a navigation tree and resolves every node to a remote page.
pub struct TreeSynchronizer<'a, S> {
    store: &'a S,
    space_key: &'a str,
    prefix: &'a str,
}

impl<'a, S: PageStore> TreeSynchronizer<'a, S> {
    /// Create a synchronizer for one space and title prefix.
    pub fn new(store: &'a S, space_key: &'a str, prefix: &'a str) -> Self {
        Self {
            store,
            space_key,
            prefix,
        }
    }

    /// Resolve `nav` depth-first under `parent_id`.
    ///
    /// A node whose lookup or creation fails is skipped together with its
    /// subtree; siblings are still processed.
    pub fn sync(&self, nav: &[NavigationNode], parent_id: u64) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        self.sync_nodes(nav, parent_id, &mut outcome);
        info!(
            mapped = outcome.pages.len(),
            created = outcome.created,
            reused = outcome.reused,
            failed = outcome.failed,
            "Page tree synchronized"
        );
        outcome
    }

    fn sync_nodes(&self, nodes: &[NavigationNode], parent_id: u64, outcome: &mut SyncOutcome) {
        for node in nodes {
            let title = format!("{}{}", self.prefix, node.title());
            let Some(page) = self.resolve(node, &title, parent_id, outcome) else {
                continue;
            };
            match node {
                NavigationNode::Page(leaf) => Self::record_leaf(leaf, page, outcome),
                NavigationNode::Section(_) => self.sync_nodes(node.children(), page.id, outcome),
            }
        }
    }

    fn resolve(
        &self,
        node: &NavigationNode,
        title: &str,
        parent_id: u64,
        outcome: &mut SyncOutcome,
    ) -> Option<RemotePageRef> {
        match self.store.find_by_title(self.space_key, title) {
            Ok(Some(page)) => {
                debug!(page = %page, "Reusing existing page");
                outcome.reused += 1;
                Some(page)
            }
            Ok(None) => {
                let body = match node {
                    NavigationNode::Section(_) => SECTION_BODY,
                    NavigationNode::Page(_) => LEAF_PLACEHOLDER_BODY,
                };
                match self.store.create(self.space_key, title, body, Some(parent_id)) {
                    Ok(page) => {
                        info!(page = %page, parent_id, "Created page");
                        outcome.created += 1;
                        Some(page)
                    }
                    Err(e) => {
                        error!(title, error = %e, "Failed to create page, skipping it and its children");
                        outcome.failed += 1;
                        None
                    }
                }
            }
            Err(e) => {
                error!(title, error = %e, "Failed to look up page, skipping it and its children");
                outcome.failed += 1;
                None
            }
        }
    }

    fn record_leaf(leaf: &LeafPage, page: RemotePageRef, outcome: &mut SyncOutcome) {
        let owner = outcome
            .pages
            .iter()
            .find(|(path, mapped)| mapped.id == page.id && **path != leaf.src_path)
            .map(|(path, _)| path.clone());

        if let Some(kept) = owner {
            error!(
                page = %page,
                kept = %kept,
                skipped = %leaf.src_path,
                "Two pages share a destination title, leaving the second unpublished"
            );
            outcome.collisions.push(TitleCollision {
                page,
                kept,
                skipped: leaf.src_path.clone(),
            });
            return;
        }

        if outcome.pages.contains_key(&leaf.src_path) {
            warn!(path = %leaf.src_path, "Page appears more than once in the navigation");
        }
        debug!(path = %leaf.src_path, page = %page, "Mapped page");
        outcome.pages.insert(leaf.src_path.clone(), page);
    }
}

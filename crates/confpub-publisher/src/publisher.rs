//! Publish orchestration across the site build lifecycle.
//!
//! [`Publisher`] owns everything one build needs: the remote store, the
//! path-to-page map produced by synchronization and the attachments found
//! while converting each page. The site pipeline calls its hooks in order:
//!
//! 1. [`Publisher::on_config`] once, with the store (or `None`)
//! 2. [`Publisher::on_nav`] once, with the full navigation
//! 3. [`Publisher::on_page_content`] per page, with its rendered HTML
//! 4. [`Publisher::on_post_page`] per page, after its output is written
//! 5. [`Publisher::on_post_build`] once
//!
//! No hook returns an error. Failures are logged and counted in the
//! [`PublishReport`], and the build carries on.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use confpub_config::{ConfigError, ConnectionSettings, PublisherConfig};
use confpub_confluence::{ConfluenceClient, PageStore, RemotePageRef};
use confpub_site::{LeafPage, NavigationNode};
use tracing::{debug, error, info, warn};

use crate::converter::convert_page;
use crate::error::PublishError;
use crate::sync::{PathToPageMap, TitleCollision, TreeSynchronizer};

/// Settings for one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Prefix prepended to every destination title.
    pub prefix: String,
    /// Destination space key.
    pub space_key: String,
    /// Page under which the navigation tree is mirrored.
    pub parent_page_id: u64,
    /// Convert pages but make no remote calls.
    pub dry_run: bool,
    /// Upload local images as page attachments.
    pub upload_attachments: bool,
}

impl From<&PublisherConfig> for PublishConfig {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            space_key: config.space_key.clone(),
            parent_page_id: config.parent_page_id,
            dry_run: config.dry_run,
            upload_attachments: config.upload_attachments,
        }
    }
}

/// What a publish run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// The run was a dry run.
    pub dry_run: bool,
    /// A remote store was configured.
    pub enabled: bool,
    /// Pages created during synchronization.
    pub pages_created: usize,
    /// Existing pages reused during synchronization.
    pub pages_reused: usize,
    /// Pages converted to storage format.
    pub pages_converted: usize,
    /// Pages whose content was pushed.
    pub pages_updated: usize,
    /// Pages with no remote counterpart.
    pub pages_skipped: usize,
    /// Remote failures (synchronization or content push).
    pub pages_failed: usize,
    /// Attachments uploaded.
    pub attachments_uploaded: usize,
    /// Attachments already present remotely.
    pub attachments_existing: usize,
    /// Attachments missing locally or rejected by the server.
    pub attachments_failed: usize,
    /// Leaves left unpublished because their title was taken.
    pub collisions: Vec<TitleCollision>,
}

impl PublishReport {
    /// Whether any page or attachment failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.pages_failed > 0 || self.attachments_failed > 0 || !self.collisions.is_empty()
    }
}

/// Build a Confluence client from connection settings.
///
/// Returns `None` (after logging why) when the settings could not be read,
/// which disables publishing without failing the build.
pub fn connect(
    settings: Result<ConnectionSettings, ConfigError>,
    verify_ssl: bool,
) -> Option<ConfluenceClient> {
    match settings {
        Ok(settings) => Some(ConfluenceClient::from_settings(&settings, verify_ssl)),
        Err(e) => {
            error!(error = %PublishError::from(e), "Confluence connection settings unavailable");
            None
        }
    }
}

/// Per-build publishing state.
pub struct Publisher<S> {
    config: PublishConfig,
    store: Option<S>,
    pages: PathToPageMap,
    attachments: HashMap<String, Vec<PathBuf>>,
    report: PublishReport,
}

impl<S: PageStore> Publisher<S> {
    /// Create a publisher with no store attached yet.
    pub fn new(config: PublishConfig) -> Self {
        let report = PublishReport {
            dry_run: config.dry_run,
            ..PublishReport::default()
        };
        Self {
            config,
            store: None,
            pages: PathToPageMap::new(),
            attachments: HashMap::new(),
            report,
        }
    }

    /// Attach the remote store.
    ///
    /// `None` disables every later hook except dry-run conversion.
    pub fn on_config(&mut self, store: Option<S>) {
        if self.config.dry_run {
            info!("Dry run: no changes will be made to Confluence");
        }
        match store {
            Some(store) => {
                info!(
                    space = %self.config.space_key,
                    parent_page_id = self.config.parent_page_id,
                    "Confluence publishing enabled"
                );
                self.store = Some(store);
                self.report.enabled = true;
            }
            None if self.config.dry_run => {}
            None => error!("Confluence connection not configured, publishing disabled"),
        }
    }

    /// Mirror the navigation tree into Confluence.
    pub fn on_nav(&mut self, nav: &[NavigationNode]) {
        if self.config.dry_run {
            debug!("Dry run: skipping page tree synchronization");
            return;
        }
        let Some(store) = &self.store else {
            return;
        };

        let outcome = TreeSynchronizer::new(store, &self.config.space_key, &self.config.prefix)
            .sync(nav, self.config.parent_page_id);
        self.report.pages_created += outcome.created;
        self.report.pages_reused += outcome.reused;
        self.report.pages_failed += outcome.failed;
        self.report.collisions.extend(outcome.collisions);
        self.pages = outcome.pages;
        info!(count = self.pages.len(), "Created page mappings");
    }

    /// Convert a rendered page and push it to its remote page.
    pub fn on_page_content(&mut self, page: &LeafPage, html: &str) {
        if !self.config.dry_run && self.store.is_none() {
            return;
        }

        let converted = convert_page(html, page, &self.pages);
        self.report.pages_converted += 1;
        if converted.is_placeholder() {
            warn!(error = %PublishError::Content(page.src_path.clone()), "Using placeholder content");
        }

        if self.config.dry_run {
            debug!(
                path = %page.src_path,
                bytes = converted.storage.len(),
                attachments = converted.attachments.len(),
                "Dry run: converted page"
            );
            self.attachments
                .insert(page.src_path.clone(), converted.attachments);
            return;
        }

        let Some(store) = &self.store else {
            return;
        };
        let Some(target) = self.pages.get(&page.src_path) else {
            warn!(path = %page.src_path, "No Confluence page mapped, skipping");
            self.report.pages_skipped += 1;
            return;
        };

        match push_content(store, target, &converted.storage) {
            Ok(version) => {
                info!(page = %target, version, "Updated page");
                self.report.pages_updated += 1;
                self.attachments
                    .insert(page.src_path.clone(), converted.attachments);
            }
            Err(e) => {
                error!(page = %target, error = %e, "{}", update_failure(&e));
                self.report.pages_failed += 1;
            }
        }
    }

    /// Upload the page's local images that the remote page does not have yet.
    pub fn on_post_page(&mut self, page: &LeafPage) {
        if self.config.dry_run || !self.config.upload_attachments {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };
        let Some(target) = self.pages.get(&page.src_path) else {
            return;
        };
        let Some(files) = self
            .attachments
            .get(&page.src_path)
            .filter(|files| !files.is_empty())
        else {
            return;
        };

        let existing = store.list_attachments(target.id).unwrap_or_else(|e| {
            warn!(page = %target, error = %e, "Failed to list attachments");
            HashSet::new()
        });

        for path in files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if existing.contains(&filename) {
                debug!(page = %target, file = %filename, "Attachment already present");
                self.report.attachments_existing += 1;
                continue;
            }
            if !path.is_file() {
                let err = PublishError::Attachment {
                    path: path.clone(),
                    reason: "file no longer exists".to_owned(),
                };
                warn!(page = %target, error = %err, "Skipping attachment");
                self.report.attachments_failed += 1;
                continue;
            }

            match store.upload_attachment(target.id, path) {
                Ok(()) => {
                    info!(page = %target, file = %filename, "Uploaded attachment");
                    self.report.attachments_uploaded += 1;
                }
                Err(e) => {
                    let err = PublishError::Attachment {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    warn!(
                        page = %target,
                        error = %err,
                        "Failed to upload attachment, possibly due to permissions or file size limits"
                    );
                    self.report.attachments_failed += 1;
                }
            }
        }
    }

    /// Log the run summary and return the report.
    pub fn on_post_build(&self) -> PublishReport {
        let report = &self.report;
        if report.dry_run {
            info!(
                converted = report.pages_converted,
                "Dry run completed, no changes made to Confluence"
            );
        } else if report.enabled {
            info!(
                updated = report.pages_updated,
                created = report.pages_created,
                failed = report.pages_failed,
                attachments = report.attachments_uploaded,
                "Published pages to Confluence"
            );
        } else {
            info!("Publishing skipped, Confluence connection not configured");
        }
        report.clone()
    }

    /// Leaf source path → remote page, as resolved by [`Self::on_nav`].
    pub fn pages(&self) -> &PathToPageMap {
        &self.pages
    }

    /// Attachments recorded for a page.
    pub fn attachments_for(&self, src_path: &str) -> &[PathBuf] {
        self.attachments.get(src_path).map_or(&[], Vec::as_slice)
    }
}

/// Log message for a rejected update. A 409 means the page changed between
/// reading its version and writing.
fn update_failure(error: &PublishError) -> &'static str {
    match error {
        PublishError::Remote(remote) if remote.status() == Some(409) => {
            "Page was modified during publishing, update rejected"
        }
        _ => "Failed to update page",
    }
}

/// Replace a page's body, based on its version right before the update.
fn push_content<S: PageStore>(
    store: &S,
    target: &RemotePageRef,
    body: &str,
) -> Result<u32, PublishError> {
    let version = store.current_version(target.id)?;
    Ok(store.update(target.id, &target.title, body, version)?)
}

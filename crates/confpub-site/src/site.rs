//! Loaded site: navigation plus page rendering.

use std::path::{Path, PathBuf};

use crate::error::SiteError;
use crate::markdown::MarkdownRenderer;
use crate::mkdocs::{MkDocsConfig, build_nav};
use crate::nav::{LeafPage, NavigationNode, leaves};
use crate::scanner::scan_docs_dir;

/// A documentation site ready to be published.
#[derive(Debug)]
pub struct Site {
    name: String,
    docs_dir: PathBuf,
    nav: Vec<NavigationNode>,
    renderer: MarkdownRenderer,
}

impl Site {
    /// Load a site from its `mkdocs.yml`.
    ///
    /// Uses the declared `nav` when present, otherwise scans the docs directory.
    pub fn load(mkdocs_file: &Path) -> Result<Self, SiteError> {
        let config = MkDocsConfig::load(mkdocs_file)?;
        let config_dir = config_dir(mkdocs_file)?;
        let docs_dir = config.docs_dir(&config_dir);

        let nav = match &config.nav {
            Some(nav) => build_nav(nav, &docs_dir)?,
            None => scan_docs_dir(&docs_dir)?,
        };

        let site = Self::new(
            config.site_name.unwrap_or_else(|| "Documentation".to_owned()),
            docs_dir,
            nav,
        );
        tracing::debug!(
            site = %site.name,
            page_count = site.pages().len(),
            "Site loaded"
        );
        Ok(site)
    }

    /// Create a site from an already built navigation tree.
    pub fn new(name: String, docs_dir: PathBuf, nav: Vec<NavigationNode>) -> Self {
        Self {
            name,
            docs_dir,
            nav,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Site name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Docs directory.
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Top-level navigation nodes.
    pub fn nav(&self) -> &[NavigationNode] {
        &self.nav
    }

    /// Leaf pages, depth-first in navigation order.
    pub fn pages(&self) -> Vec<&LeafPage> {
        leaves(&self.nav)
    }

    /// Read and render a page to HTML.
    pub fn render(&self, page: &LeafPage) -> Result<String, SiteError> {
        let source = std::fs::read_to_string(&page.abs_src_path).map_err(|e| SiteError::Io {
            path: page.abs_src_path.clone(),
            source: e,
        })?;
        Ok(self.renderer.render(&source))
    }
}

/// Absolute directory holding `mkdocs.yml`, so page and image paths
/// resolved under it are absolute too.
fn config_dir(mkdocs_file: &Path) -> Result<PathBuf, SiteError> {
    let absolute = std::path::absolute(mkdocs_file).map_err(|e| SiteError::Io {
        path: mkdocs_file.to_path_buf(),
        source: e,
    })?;
    Ok(absolute
        .parent()
        .map_or_else(|| absolute.clone(), Path::to_path_buf))
}

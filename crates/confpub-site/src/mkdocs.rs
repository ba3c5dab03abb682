//! `mkdocs.yml` loading.
//!
//! Only the keys that shape the navigation are read: `site_name`,
//! `docs_dir` and `nav`. Everything else (theme, plugins, extensions) is
//! ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::SiteError;
use crate::markdown::{extract_title, split_front_matter, title_from_stem};
use crate::nav::{LeafPage, NavigationNode, Section};

/// The subset of `mkdocs.yml` confpub understands.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MkDocsConfig {
    /// Site name.
    pub site_name: Option<String>,
    /// Docs directory relative to `mkdocs.yml` (default `docs`).
    pub docs_dir: Option<String>,
    /// Raw `nav` tree.
    pub nav: Option<Value>,
}

impl MkDocsConfig {
    /// Read and parse `mkdocs.yml`.
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let content = std::fs::read_to_string(path).map_err(|e| SiteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse `mkdocs.yml` content.
    pub fn parse(content: &str) -> Result<Self, SiteError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Docs directory resolved against the directory holding `mkdocs.yml`.
    pub fn docs_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(self.docs_dir.as_deref().unwrap_or("docs"))
    }
}

/// Build navigation nodes from a `nav` value.
///
/// Accepted entry forms:
/// - `- path.md`
/// - `- Title: path.md`
/// - `- Title: [ ...children ]`
///
/// External links and entries pointing at missing files are skipped with a
/// warning.
pub fn build_nav(nav: &Value, docs_dir: &Path) -> Result<Vec<NavigationNode>, SiteError> {
    let Value::Sequence(items) = nav else {
        return Err(SiteError::Validation("nav must be a list".to_owned()));
    };

    let mut nodes = Vec::with_capacity(items.len());
    for item in items {
        if let Some(node) = build_nav_item(item, docs_dir)? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

fn build_nav_item(item: &Value, docs_dir: &Path) -> Result<Option<NavigationNode>, SiteError> {
    match item {
        Value::String(path) => Ok(leaf(None, path, docs_dir)),
        Value::Mapping(map) if map.len() == 1 => {
            let Some((key, value)) = map.iter().next() else {
                return Ok(None);
            };
            let title = key
                .as_str()
                .ok_or_else(|| SiteError::Validation(format!("nav title must be a string: {key:?}")))?;
            match value {
                Value::String(path) => Ok(leaf(Some(title), path, docs_dir)),
                Value::Sequence(_) => Ok(Some(NavigationNode::Section(Section {
                    title: title.to_owned(),
                    children: build_nav(value, docs_dir)?,
                }))),
                other => Err(SiteError::Validation(format!(
                    "unsupported nav entry for '{title}': {other:?}"
                ))),
            }
        }
        other => Err(SiteError::Validation(format!(
            "unsupported nav entry: {other:?}"
        ))),
    }
}

fn leaf(title: Option<&str>, path: &str, docs_dir: &Path) -> Option<NavigationNode> {
    if is_external(path) {
        tracing::debug!(url = path, "Skipping external nav link");
        return None;
    }

    let src_path = path.trim_start_matches("./").replace('\\', "/");
    let abs_src_path = docs_dir.join(&src_path);
    if !abs_src_path.is_file() {
        tracing::warn!(path = %abs_src_path.display(), "Nav entry points to a missing file");
        return None;
    }

    let title = match title {
        Some(t) => t.to_owned(),
        None => page_title(&abs_src_path),
    };

    Some(NavigationNode::Page(LeafPage {
        src_path,
        abs_src_path,
        title,
    }))
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("mailto:")
}

/// Resolve a page title: front matter `title`, then first H1, then file stem.
pub fn page_title(path: &Path) -> String {
    if let Ok(content) = std::fs::read_to_string(path) {
        let split = split_front_matter(&content);
        if let Some(title) = split
            .yaml
            .and_then(|yaml| serde_yaml::from_str::<Value>(yaml).ok())
            .and_then(|meta| meta.get("title").and_then(Value::as_str).map(str::to_owned))
        {
            return title;
        }
        if let Some(title) = extract_title(split.body) {
            return title;
        }
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.eq_ignore_ascii_case("index") {
        return "Home".to_owned();
    }
    title_from_stem(&stem)
}

//! Navigation discovery by filesystem walking.
//!
//! Used when `mkdocs.yml` has no `nav`. Within each directory `index.md`
//! comes first, then the other markdown files by name, then subdirectories
//! (by name) as sections. Hidden entries and empty directories are skipped.

use std::fs;
use std::path::Path;

use crate::error::SiteError;
use crate::markdown::title_from_stem;
use crate::mkdocs::page_title;
use crate::nav::{LeafPage, NavigationNode, Section};

/// Build navigation nodes by scanning `docs_dir`.
pub fn scan_docs_dir(docs_dir: &Path) -> Result<Vec<NavigationNode>, SiteError> {
    if !docs_dir.is_dir() {
        return Err(SiteError::Validation(format!(
            "docs directory not found: {}",
            docs_dir.display()
        )));
    }
    scan_directory(docs_dir, "")
}

fn scan_directory(dir: &Path, rel_prefix: &str) -> Result<Vec<NavigationNode>, SiteError> {
    let entries = fs::read_dir(dir).map_err(|e| SiteError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        if is_dir {
            dirs.push(name);
        } else if Path::new(&name).extension().is_some_and(|e| e == "md") {
            files.push(name);
        }
    }

    files.sort_by(|a, b| {
        let a_index = a.eq_ignore_ascii_case("index.md");
        let b_index = b.eq_ignore_ascii_case("index.md");
        b_index.cmp(&a_index).then_with(|| a.cmp(b))
    });
    dirs.sort();

    let mut nodes = Vec::with_capacity(files.len() + dirs.len());
    for name in files {
        let abs_src_path = dir.join(&name);
        nodes.push(NavigationNode::Page(LeafPage {
            src_path: format!("{rel_prefix}{name}"),
            title: page_title(&abs_src_path),
            abs_src_path,
        }));
    }
    for name in dirs {
        let children = scan_directory(&dir.join(&name), &format!("{rel_prefix}{name}/"))?;
        if children.is_empty() {
            continue;
        }
        nodes.push(NavigationNode::Section(Section {
            title: title_from_stem(&name),
            children,
        }));
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::nav::leaves;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_orders_index_files_then_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path();
        write(docs, "zeta.md", "# Zeta\n");
        write(docs, "alpha.md", "# Alpha\n");
        write(docs, "index.md", "# Home Page\n");
        write(docs, "user-guide/install.md", "# Install\n");
        write(docs, ".hidden/secret.md", "# Secret\n");
        fs::create_dir_all(docs.join("empty")).unwrap();

        let nav = scan_docs_dir(docs).unwrap();

        let top: Vec<_> = nav.iter().map(NavigationNode::title).collect();
        assert_eq!(top, ["Home Page", "Alpha", "Zeta", "User guide"]);
        let srcs: Vec<_> = leaves(&nav).iter().map(|p| p.src_path.as_str()).collect();
        assert_eq!(
            srcs,
            ["index.md", "alpha.md", "zeta.md", "user-guide/install.md"]
        );
    }

    #[test]
    fn test_scan_ignores_non_markdown() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "diagram.png", "png");
        write(temp.path(), "notes.txt", "txt");

        assert!(scan_docs_dir(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let err = scan_docs_dir(Path::new("/nonexistent/docs")).unwrap_err();

        assert!(matches!(err, SiteError::Validation(_)));
    }
}

//! Lexical path helpers for image sources and link targets.
//!
//! Nothing here touches the filesystem: `..` is resolved textually, the way
//! a browser resolves a relative URL.

use std::path::{Component, Path, PathBuf};

/// Remove `.` and `..` components from a path.
///
/// `..` at the root of an absolute path is dropped; on a relative path with
/// nothing left to pop it is kept.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a link target against the directory of a docs-relative page path.
///
/// Both inputs and the result use `/` separators relative to the docs root.
/// A target starting with `/` is taken from the docs root. Returns `None`
/// when the target climbs above the docs root.
pub(crate) fn resolve_doc_path(src_path: &str, target: &str) -> Option<String> {
    let mut segments: Vec<&str> = match src_path.rsplit_once('/') {
        Some((dir, _)) if !target.starts_with('/') => dir.split('/').collect(),
        _ => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }
    Some(segments.join("/"))
}

//! Navigation tree.
//!
//! The tree mixes sections (groupings with ordered children) and leaf pages
//! (individual markdown documents), in the order the site declares them.

use std::path::PathBuf;

/// A single markdown document in the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafPage {
    /// Path relative to the docs directory, `/`-separated (e.g. `guides/install.md`).
    pub src_path: String,
    /// Absolute path to the markdown source.
    pub abs_src_path: PathBuf,
    /// Display title.
    pub title: String,
}

/// A titled group of navigation nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Display title.
    pub title: String,
    /// Child nodes, in declaration order.
    pub children: Vec<NavigationNode>,
}

/// Navigation tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationNode {
    /// A markdown document.
    Page(LeafPage),
    /// A group of nodes.
    Section(Section),
}

impl NavigationNode {
    /// Display title of the node.
    pub fn title(&self) -> &str {
        match self {
            Self::Page(page) => &page.title,
            Self::Section(section) => &section.title,
        }
    }

    /// Child nodes (always empty for pages).
    pub fn children(&self) -> &[NavigationNode] {
        match self {
            Self::Page(_) => &[],
            Self::Section(section) => &section.children,
        }
    }
}

/// Collect every leaf page under `nodes`, depth-first in declaration order.
pub fn leaves(nodes: &[NavigationNode]) -> Vec<&LeafPage> {
    let mut out = Vec::new();
    collect_leaves(nodes, &mut out);
    out
}

fn collect_leaves<'a>(nodes: &'a [NavigationNode], out: &mut Vec<&'a LeafPage>) {
    for node in nodes {
        match node {
            NavigationNode::Page(page) => out.push(page),
            NavigationNode::Section(section) => collect_leaves(&section.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(src: &str, title: &str) -> NavigationNode {
        NavigationNode::Page(LeafPage {
            src_path: src.to_owned(),
            abs_src_path: PathBuf::from("/docs").join(src),
            title: title.to_owned(),
        })
    }

    fn section(title: &str, children: Vec<NavigationNode>) -> NavigationNode {
        NavigationNode::Section(Section {
            title: title.to_owned(),
            children,
        })
    }

    #[test]
    fn test_leaves_depth_first_order() {
        let nav = vec![
            page("index.md", "Home"),
            section(
                "Guides",
                vec![
                    page("guides/install.md", "Install"),
                    section("Advanced", vec![page("guides/adv/tuning.md", "Tuning")]),
                    page("guides/usage.md", "Usage"),
                ],
            ),
            page("about.md", "About"),
        ];

        let titles: Vec<_> = leaves(&nav).iter().map(|p| p.title.as_str()).collect();

        assert_eq!(titles, ["Home", "Install", "Tuning", "Usage", "About"]);
    }

    #[test]
    fn test_leaves_empty_tree() {
        assert!(leaves(&[]).is_empty());
    }

    #[test]
    fn test_node_accessors() {
        let node = section("Guides", vec![page("a.md", "A")]);

        assert_eq!(node.title(), "Guides");
        assert_eq!(node.children().len(), 1);
        assert!(node.children()[0].children().is_empty());
    }
}

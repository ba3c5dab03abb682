//! MkDocs site model for confpub.
//!
//! Loads the navigation tree declared in `mkdocs.yml` (or discovered from the
//! docs directory) and renders page markdown to HTML, producing the inputs
//! the publisher consumes.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use confpub_site::Site;
//!
//! let site = Site::load(Path::new("mkdocs.yml"))?;
//! for page in site.pages() {
//!     let html = site.render(page)?;
//!     println!("{}: {} bytes", page.src_path, html.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod markdown;
mod mkdocs;
mod nav;
mod scanner;
mod site;

pub use error::SiteError;
pub use markdown::{MarkdownRenderer, extract_title, split_front_matter, title_from_stem};
pub use mkdocs::{MkDocsConfig, build_nav, page_title};
pub use nav::{LeafPage, NavigationNode, Section, leaves};
pub use scanner::scan_docs_dir;
pub use site::Site;

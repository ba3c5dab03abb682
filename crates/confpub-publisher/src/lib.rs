//! Publishes an MkDocs site to Confluence.
//!
//! Three parts, used in this order during a build:
//!
//! - [`TreeSynchronizer`] mirrors the navigation tree as Confluence pages
//!   and yields a [`PathToPageMap`].
//! - [`convert_page`] turns rendered page HTML into storage format and
//!   collects local images to attach.
//! - [`Publisher`] holds the per-build state and runs both from the site
//!   pipeline's lifecycle hooks.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use confpub_config::ConnectionSettings;
//! use confpub_publisher::{PublishConfig, Publisher, connect};
//! use confpub_site::Site;
//!
//! let site = Site::load(Path::new("mkdocs.yml"))?;
//! let mut publisher = Publisher::new(PublishConfig {
//!     prefix: "Docs-".to_owned(),
//!     space_key: "DOCS".to_owned(),
//!     parent_page_id: 123_456,
//!     dry_run: false,
//!     upload_attachments: true,
//! });
//!
//! publisher.on_config(connect(ConnectionSettings::from_env(), true));
//! publisher.on_nav(site.nav());
//! for page in site.pages() {
//!     let html = site.render(page)?;
//!     publisher.on_page_content(page, &html);
//!     publisher.on_post_page(page);
//! }
//! let report = publisher.on_post_build();
//! println!("{} pages updated", report.pages_updated);
//! # Ok(())
//! # }
//! ```

mod converter;
mod error;
mod paths;
mod publisher;
mod sync;

pub use converter::{ConvertedPage, EMPTY_CONTENT_PLACEHOLDER, LANGUAGE_SUBSTITUTIONS, convert_page};
pub use error::PublishError;
pub use publisher::{PublishConfig, PublishReport, Publisher, connect};
pub use sync::{
    LEAF_PLACEHOLDER_BODY, PathToPageMap, SECTION_BODY, SyncOutcome, TitleCollision,
    TreeSynchronizer,
};

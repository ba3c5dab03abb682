//! Confluence integration for confpub.
//!
//! This crate provides the remote side of publishing:
//! - [`ConfluenceClient`]: REST API client with Bearer or Basic authentication
//! - [`PageStore`]: the page operations the publisher relies on
//! - `MockPageStore`: in-memory store for tests (behind the `mock` feature)
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use confpub_config::ConnectionSettings;
//! use confpub_confluence::{ConfluenceClient, PageStore};
//!
//! let settings = ConnectionSettings::from_env()?;
//! let client = ConfluenceClient::from_settings(&settings, true);
//!
//! if let Some(page) = client.find_by_title("DOCS", "Docs-Install")? {
//!     println!("Found {page}");
//! }
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

// Store abstraction
mod store;
pub use store::PageStore;

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockPage, MockPageStore};

// Types
pub mod types;
pub use types::RemotePageRef;

// Errors
pub mod error;
pub use error::ConfluenceError;

//! Site loading errors.

use std::path::PathBuf;

/// Error while loading the site or reading page sources.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// File could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// `mkdocs.yml` is not valid YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Structurally invalid site definition.
    #[error("invalid site: {0}")]
    Validation(String),
}

//! CLI error types.

use confpub_config::ConfigError;
use confpub_site::SiteError;

/// CLI error type.
///
/// Publishing problems never show up here: the publisher logs them and
/// reports counts instead. These are the failures that stop a command.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pandoc output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{program} failed: {message}")]
    Tool { program: String, message: String },

    #[error("{0}")]
    Validation(String),
}

//! Publishing errors.
//!
//! None of these fail a build: the publisher logs them and keeps going. They
//! exist so every failure path reports in the same vocabulary.

use std::path::PathBuf;

use confpub_config::ConfigError;
use confpub_confluence::ConfluenceError;

/// Error raised while publishing a site.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Connection settings are missing or invalid. Publishing is disabled.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The remote API rejected a request.
    #[error("remote API error: {0}")]
    Remote(#[from] ConfluenceError),

    /// Converted content was empty and a placeholder was pushed instead.
    #[error("no publishable content in {0}")]
    Content(String),

    /// A local attachment is missing or its upload was rejected.
    #[error("attachment {}: {reason}", path.display())]
    Attachment {
        /// Local file path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = PublishError::from(ConfluenceError::HttpResponse {
            status: 403,
            body: "forbidden".to_owned(),
        });

        assert_eq!(err.to_string(), "remote API error: HTTP error: 403 - forbidden");
    }

    #[test]
    fn test_attachment_error_display() {
        let err = PublishError::Attachment {
            path: PathBuf::from("/docs/diagram.png"),
            reason: "file not found".to_owned(),
        };

        assert_eq!(
            err.to_string(),
            "attachment /docs/diagram.png: file not found"
        );
    }
}

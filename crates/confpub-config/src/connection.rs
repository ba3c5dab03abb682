//! Confluence connection settings read from the process environment.

use crate::{ConfigError, require_http_url, require_non_empty};

/// Environment variable holding the Confluence base URL.
pub const URL_VAR: &str = "CONFLUENCE_URL";
/// Environment variable holding the optional username (enables Basic auth).
pub const USERNAME_VAR: &str = "CONFLUENCE_USERNAME";
/// Environment variable holding the API token.
pub const TOKEN_VAR: &str = "CONFLUENCE_API_TOKEN";

/// Connection settings for the Confluence REST API.
///
/// These are never read from `confpub.toml`: credentials stay in the
/// environment (or a `.env` file loaded by the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Confluence base URL (without `/rest/api`).
    pub base_url: String,
    /// Username for Basic authentication. `None` selects Bearer tokens.
    pub username: Option<String>,
    /// API token (personal access token or Cloud API token).
    pub api_token: String,
}

impl ConnectionSettings {
    /// Read connection settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read connection settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(URL_VAR).unwrap_or_default();
        require_non_empty(&base_url, URL_VAR)?;
        require_http_url(&base_url, URL_VAR)?;

        let api_token = lookup(TOKEN_VAR).unwrap_or_default();
        require_non_empty(&api_token, TOKEN_VAR)?;

        let username = lookup(USERNAME_VAR).filter(|u| !u.is_empty());

        Ok(Self {
            base_url,
            username,
            api_token,
        })
    }
}

//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API with Bearer
//! (personal access token) or Basic (username + API token) authentication.

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use confpub_config::ConnectionSettings;
use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::{Agent, Body};

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create client from connection settings.
    ///
    /// A username selects Basic authentication (`username:token`), otherwise
    /// the token is sent as a Bearer token.
    ///
    /// # Arguments
    /// * `settings` - Base URL and credentials read from the environment
    /// * `verify_ssl` - Whether to verify the server's TLS certificate
    pub fn from_settings(settings: &ConnectionSettings, verify_ssl: bool) -> Self {
        let auth_header = match &settings.username {
            Some(username) => {
                debug!("Using Basic authentication");
                let credentials = STANDARD.encode(format!("{username}:{}", settings.api_token));
                format!("Basic {credentials}")
            }
            None => {
                debug!("Using Bearer token authentication");
                format!("Bearer {}", settings.api_token)
            }
        };

        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(!verify_ssl)
                    .build(),
            )
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            auth_header,
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

/// Turn a non-success response into [`ConfluenceError::HttpResponse`].
fn read_success(response: ureq::http::Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if !(200..300).contains(&status) {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn settings(username: Option<&str>) -> ConnectionSettings {
        ConnectionSettings {
            base_url: "https://wiki.example.com/".to_owned(),
            username: username.map(str::to_owned),
            api_token: "token123".to_owned(),
        }
    }

    #[test]
    fn test_bearer_auth_without_username() {
        let client = ConfluenceClient::from_settings(&settings(None), false);

        assert_eq!(client.auth_header, "Bearer token123");
    }

    #[test]
    fn test_basic_auth_with_username() {
        let client = ConfluenceClient::from_settings(&settings(Some("bot")), true);

        // base64("bot:token123")
        assert_eq!(client.auth_header, "Basic Ym90OnRva2VuMTIz");
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let client = ConfluenceClient::from_settings(&settings(None), false);

        assert_eq!(client.api_url(), "https://wiki.example.com/rest/api");
    }
}

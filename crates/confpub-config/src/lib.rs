//! Configuration management for confpub.
//!
//! Parses `confpub.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//! Connection credentials are not part of the file; see [`ConnectionSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `publisher.prefix`
//! - `publisher.space_key`

mod connection;
mod expand;

pub use connection::{ConnectionSettings, TOKEN_VAR, URL_VAR, USERNAME_VAR};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override dry-run flag.
    pub dry_run: Option<bool>,
    /// Override destination title prefix.
    pub prefix: Option<String>,
    /// Override attachment upload flag.
    pub upload_attachments: Option<bool>,
    /// Override TLS certificate verification flag.
    pub verify_ssl: Option<bool>,
    /// Override path to `mkdocs.yml`.
    pub mkdocs_file: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confpub.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Publisher configuration.
    pub publisher: Option<PublisherConfig>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    mkdocs_file: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Path to the site generator's `mkdocs.yml`.
    pub mkdocs_file: PathBuf,
}

/// Publisher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// Prefix prepended to every destination page title.
    #[serde(default)]
    pub prefix: String,
    /// Destination space key.
    pub space_key: String,
    /// Page under which the navigation tree is mirrored.
    pub parent_page_id: u64,
    /// Perform all local work but issue no network calls.
    #[serde(default)]
    pub dry_run: bool,
    /// Verify TLS certificates of the Confluence server.
    #[serde(default)]
    pub verify_ssl: bool,
    /// Upload images referenced by pages as attachments.
    #[serde(default = "default_upload_attachments")]
    pub upload_attachments: bool,
}

impl PublisherConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.space_key, "publisher.space_key")?;
        if self.parent_page_id == 0 {
            return Err(ConfigError::Validation(
                "publisher.parent_page_id cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_upload_attachments() -> bool {
    true
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`publisher.space_key`").
        field: String,
        /// Error message (e.g., "${`DOCS_SPACE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
pub(crate) fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `confpub.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// Publisher overrides only apply when a `[publisher]` section exists;
    /// the CLI cannot supply a space key or parent page on its own.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mkdocs_file) = &settings.mkdocs_file {
            self.docs_resolved.mkdocs_file.clone_from(mkdocs_file);
        }
        let Some(publisher) = self.publisher.as_mut() else {
            return;
        };
        if let Some(dry_run) = settings.dry_run {
            publisher.dry_run = dry_run;
        }
        if let Some(prefix) = &settings.prefix {
            publisher.prefix.clone_from(prefix);
        }
        if let Some(upload) = settings.upload_attachments {
            publisher.upload_attachments = upload;
        }
        if let Some(verify_ssl) = settings.verify_ssl {
            publisher.verify_ssl = verify_ssl;
        }
    }

    /// Get validated publisher configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_publisher(&self) -> Result<&PublisherConfig, ConfigError> {
        let publisher = self.publisher.as_ref().ok_or_else(|| {
            ConfigError::Validation("[publisher] section required in config".into())
        })?;
        publisher.validate()?;
        Ok(publisher)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            publisher: None,
            docs_resolved: DocsConfig {
                mkdocs_file: base.join("mkdocs.yml"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// A missing `[publisher]` section is not an error here; commands that
    /// publish call [`Config::require_publisher`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(publisher) = &self.publisher {
            publisher.validate()?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut publisher) = self.publisher {
            publisher.prefix = expand::expand_env(&publisher.prefix, "publisher.prefix")?;
            publisher.space_key =
                expand::expand_env(&publisher.space_key, "publisher.space_key")?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            mkdocs_file: config_dir.join(self.docs.mkdocs_file.as_deref().unwrap_or("mkdocs.yml")),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_publisher_config() -> PublisherConfig {
        PublisherConfig {
            prefix: String::new(),
            space_key: "DOCS".to_owned(),
            parent_page_id: 327_683,
            dry_run: false,
            verify_ssl: false,
            upload_attachments: true,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert!(config.publisher.is_none());
        assert_eq!(
            config.docs_resolved.mkdocs_file,
            PathBuf::from("/test/mkdocs.yml")
        );
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.publisher.is_none());
    }

    #[test]
    fn test_parse_publisher_config_defaults() {
        let toml = r#"
[publisher]
space_key = "DOCS"
parent_page_id = 327683
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let publisher = config.publisher.unwrap();

        assert_eq!(publisher.prefix, "");
        assert_eq!(publisher.space_key, "DOCS");
        assert_eq!(publisher.parent_page_id, 327_683);
        assert!(!publisher.dry_run);
        assert!(!publisher.verify_ssl);
        assert!(publisher.upload_attachments);
    }

    #[test]
    fn test_parse_publisher_config_all_fields() {
        let toml = r#"
[publisher]
prefix = "Docs-"
space_key = "DOCS"
parent_page_id = 42
dry_run = true
verify_ssl = true
upload_attachments = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let publisher = config.publisher.unwrap();

        assert_eq!(publisher.prefix, "Docs-");
        assert!(publisher.dry_run);
        assert!(publisher.verify_ssl);
        assert!(!publisher.upload_attachments);
    }

    #[test]
    fn test_parse_publisher_missing_space_key_fails() {
        let toml = r"
[publisher]
parent_page_id = 42
";
        let result: Result<Config, _> = toml::from_str(toml);

        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
mkdocs_file = "site/mkdocs.yml"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.mkdocs_file,
            PathBuf::from("/project/site/mkdocs.yml")
        );
    }

    #[test]
    fn test_resolve_paths_default_mkdocs_file() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.mkdocs_file,
            PathBuf::from("/project/mkdocs.yml")
        );
    }

    #[test]
    fn test_apply_cli_settings_publisher_overrides() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.publisher = Some(valid_publisher_config());

        let overrides = CliSettings {
            dry_run: Some(true),
            prefix: Some("Team-".to_owned()),
            upload_attachments: Some(false),
            verify_ssl: Some(true),
            mkdocs_file: None,
        };
        config.apply_cli_settings(&overrides);

        let publisher = config.publisher.unwrap();
        assert!(publisher.dry_run);
        assert_eq!(publisher.prefix, "Team-");
        assert!(!publisher.upload_attachments);
        assert!(publisher.verify_ssl);
        assert_eq!(publisher.space_key, "DOCS"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_without_publisher_section() {
        let mut config = Config::default_with_base(Path::new("/test"));

        let overrides = CliSettings {
            dry_run: Some(true),
            mkdocs_file: Some(PathBuf::from("/other/mkdocs.yml")),
            ..Default::default()
        };
        config.apply_cli_settings(&overrides);

        assert!(config.publisher.is_none());
        assert_eq!(
            config.docs_resolved.mkdocs_file,
            PathBuf::from("/other/mkdocs.yml")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.publisher = Some(valid_publisher_config());

        config.apply_cli_settings(&CliSettings::default());

        let publisher = config.publisher.unwrap();
        assert!(!publisher.dry_run);
        assert!(publisher.upload_attachments);
    }

    #[test]
    fn test_expand_env_vars_publisher() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFPUB_CFG_SPACE", "ENG");
            std::env::set_var("CONFPUB_CFG_PREFIX", "Eng-");
        }
        let toml = r#"
[publisher]
prefix = "${CONFPUB_CFG_PREFIX}"
space_key = "${CONFPUB_CFG_SPACE}"
parent_page_id = 1
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let publisher = config.publisher.unwrap();
        assert_eq!(publisher.space_key, "ENG");
        assert_eq!(publisher.prefix, "Eng-");
        unsafe {
            std::env::remove_var("CONFPUB_CFG_SPACE");
            std::env::remove_var("CONFPUB_CFG_PREFIX");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_CFG_MISSING");
        }
        let toml = r#"
[publisher]
space_key = "${CONFPUB_CFG_MISSING}"
parent_page_id = 1
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
    }

    #[test]
    fn test_publisher_validate_valid() {
        assert!(valid_publisher_config().validate().is_ok());
    }

    #[test]
    fn test_publisher_validate_empty_space_key() {
        let mut publisher = valid_publisher_config();
        publisher.space_key = "  ".to_owned();

        let err = publisher.validate().unwrap_err();
        assert!(err.to_string().contains("publisher.space_key"));
    }

    #[test]
    fn test_publisher_validate_zero_parent() {
        let mut publisher = valid_publisher_config();
        publisher.parent_page_id = 0;

        let err = publisher.validate().unwrap_err();
        assert!(err.to_string().contains("publisher.parent_page_id"));
    }

    #[test]
    fn test_require_publisher_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));

        let err = config.require_publisher().unwrap_err();
        assert!(err.to_string().contains("[publisher]"));
    }

    #[test]
    fn test_require_publisher_returns_validated() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.publisher = Some(valid_publisher_config());

        let publisher = config.require_publisher().unwrap();
        assert_eq!(publisher.space_key, "DOCS");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/confpub.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}

//! `confpub publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use confpub_config::{CliSettings, Config, ConnectionSettings, PublisherConfig};
use confpub_publisher::{PublishConfig, PublishReport, Publisher, connect};
use confpub_site::Site;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to configuration file (default: auto-discover confpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to mkdocs.yml (overrides config).
    #[arg(short = 'f', long)]
    mkdocs_file: Option<PathBuf>,

    /// Convert pages without changing Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Prefix added to every page title (overrides config).
    #[arg(long)]
    prefix: Option<String>,

    /// Do not upload images as attachments.
    #[arg(long)]
    no_attachments: bool,

    /// Verify TLS certificates (overrides config).
    #[arg(long)]
    verify_ssl: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the site cannot be loaded.
    /// Remote failures are reported in the summary instead.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        load_dotenv();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let publisher_config = require_publisher_config(&config, &output)?;
        let site = Site::load(&config.docs_resolved.mkdocs_file)?;
        output.info(&format!(
            "Publishing {} ({}) to space {}...",
            site.name(),
            site.docs_dir().display(),
            publisher_config.space_key
        ));

        let mut publisher = Publisher::new(PublishConfig::from(publisher_config));
        let store = if publisher_config.dry_run {
            None
        } else {
            connect(ConnectionSettings::from_env(), publisher_config.verify_ssl)
        };
        publisher.on_config(store);
        publisher.on_nav(site.nav());
        for page in site.pages() {
            let html = site.render(page)?;
            publisher.on_page_content(page, &html);
            publisher.on_post_page(page);
        }

        print_report(&output, &publisher.on_post_build());
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            dry_run: self.dry_run.then_some(true),
            prefix: self.prefix.clone(),
            upload_attachments: self.no_attachments.then_some(false),
            verify_ssl: self.verify_ssl.then_some(true),
            mkdocs_file: self.mkdocs_file.clone(),
        }
    }
}

/// Load `.env` from the working directory, if present.
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
    }
}

fn require_publisher_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a PublisherConfig, CliError> {
    config.require_publisher().map_err(|e| {
        if config.publisher.is_none() {
            output.info("\nAdd the following to your confpub.toml:");
            output.info("\n[publisher]");
            output.info(r#"space_key = "DOCS""#);
            output.info("parent_page_id = 123456");
            output.info(r#"prefix = "Docs-""#);
        }
        CliError::from(e)
    })
}

fn print_report(output: &Output, report: &PublishReport) {
    if report.dry_run {
        output.highlight("\n[DRY RUN] No changes made.");
    } else if !report.enabled {
        output.warning("\nPublishing was disabled; see the log for details.");
    }

    output.field("Pages created", report.pages_created);
    output.field("Pages reused", report.pages_reused);
    output.field("Pages converted", report.pages_converted);
    output.field("Pages updated", report.pages_updated);
    output.field("Pages skipped", report.pages_skipped);
    output.field("Pages failed", report.pages_failed);
    output.field("Attachments uploaded", report.attachments_uploaded);
    output.field("Attachments existing", report.attachments_existing);
    output.field("Attachments failed", report.attachments_failed);

    for collision in &report.collisions {
        output.warning(&format!(
            "Title collision: {} is used by {} and {}",
            collision.page, collision.kept, collision.skipped
        ));
    }

    if report.has_failures() {
        output.warning("\nPublished with errors.");
    } else if report.enabled {
        output.success("\nPublished successfully.");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args() -> PublishArgs {
        PublishArgs {
            config: None,
            mkdocs_file: None,
            dry_run: false,
            prefix: None,
            no_attachments: false,
            verify_ssl: false,
        }
    }

    #[test]
    fn test_cli_settings_leave_config_untouched_by_default() {
        let settings = args().cli_settings();

        assert_eq!(settings.dry_run, None);
        assert_eq!(settings.prefix, None);
        assert_eq!(settings.upload_attachments, None);
        assert_eq!(settings.verify_ssl, None);
        assert_eq!(settings.mkdocs_file, None);
    }

    #[test]
    fn test_cli_settings_from_flags() {
        let settings = PublishArgs {
            mkdocs_file: Some(PathBuf::from("site/mkdocs.yml")),
            dry_run: true,
            prefix: Some("KB-".to_owned()),
            no_attachments: true,
            verify_ssl: true,
            ..args()
        }
        .cli_settings();

        assert_eq!(settings.dry_run, Some(true));
        assert_eq!(settings.prefix.as_deref(), Some("KB-"));
        assert_eq!(settings.upload_attachments, Some(false));
        assert_eq!(settings.verify_ssl, Some(true));
        assert_eq!(settings.mkdocs_file, Some(PathBuf::from("site/mkdocs.yml")));
    }

    #[test]
    fn test_dry_run_publish_without_credentials() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        std::fs::write(
            root.join("confpub.toml"),
            "[publisher]\nspace_key = \"DOCS\"\nparent_page_id = 42\n",
        )
        .unwrap();
        std::fs::write(root.join("mkdocs.yml"), "site_name: Handbook\n").unwrap();
        std::fs::create_dir(root.join("docs")).unwrap();
        std::fs::write(root.join("docs/index.md"), "# Home\n").unwrap();

        let result = PublishArgs {
            config: Some(root.join("confpub.toml")),
            dry_run: true,
            ..args()
        }
        .execute();

        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_publisher_section_fails() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("confpub.toml");
        std::fs::write(&path, "").unwrap();

        let err = PublishArgs {
            config: Some(path),
            ..args()
        }
        .execute()
        .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
    }
}

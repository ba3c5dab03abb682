//! `confpub versions` subcommand group.
//!
//! Thin wrapper over `mike` for publishing versioned builds of the site.
//! Every subcommand first makes sure `mkdocs.yml` declares mike as its
//! version provider.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use clap::{Args, Subcommand};
use regex::Regex;

use crate::error::CliError;
use crate::output::Output;
use crate::tool::{SystemRunner, ToolRunner, args};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

static ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]+$").unwrap());

/// Appended to `mkdocs.yml` when it has no version configuration.
const VERSION_PROVIDER_BLOCK: &str = "\n\n# Version provider\nextra:\n  version:\n    provider: mike\n";

/// Alias that also becomes the default version.
const DEFAULT_ALIAS: &str = "latest";

/// Arguments shared by every `versions` subcommand.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to mkdocs.yml.
    #[arg(short = 'f', long, default_value = "mkdocs.yml")]
    mkdocs_file: PathBuf,
}

impl SiteArgs {
    /// Directory the tools run in (where `mkdocs.yml` lives).
    fn site_dir(&self) -> Option<&Path> {
        self.mkdocs_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// Arguments for `versions deploy`.
#[derive(Args)]
pub(crate) struct DeployArgs {
    /// Version number (X.Y.Z).
    version: String,

    /// Alias for the version (e.g. latest, stable).
    #[arg(short, long)]
    alias: Option<String>,

    /// Move the alias if another version already has it.
    #[arg(long)]
    update_aliases: bool,

    #[command(flatten)]
    site: SiteArgs,
}

/// Arguments for `versions delete`.
#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Version or alias to delete.
    version: String,

    #[command(flatten)]
    site: SiteArgs,
}

/// Versioned documentation commands.
#[derive(Subcommand)]
pub(crate) enum VersionsCommand {
    /// Build the site and deploy it as a version.
    Deploy(DeployArgs),
    /// List deployed versions.
    List(SiteArgs),
    /// Delete a deployed version.
    Delete(DeleteArgs),
}

impl VersionsCommand {
    /// Execute the versions subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let runner = SystemRunner;

        let site = match &self {
            Self::Deploy(cmd) => &cmd.site,
            Self::List(site) => site,
            Self::Delete(cmd) => &cmd.site,
        };
        if ensure_version_provider(&site.mkdocs_file)? {
            output.info("Added versioning configuration to mkdocs.yml");
        }

        match &self {
            Self::Deploy(cmd) => {
                output.info(&format!("Deploying version {}...", cmd.version));
                deploy(
                    &runner,
                    &cmd.version,
                    cmd.alias.as_deref(),
                    cmd.update_aliases,
                    cmd.site.site_dir(),
                )?;
                output.success(&format!("Version {} deployed successfully!", cmd.version));
            }
            Self::List(site) => {
                output.highlight("Deployed versions:");
                output.info(list(&runner, site.site_dir())?.trim_end());
            }
            Self::Delete(cmd) => {
                delete(&runner, &cmd.version, cmd.site.site_dir())?;
                output.success(&format!("Version {} deleted successfully!", cmd.version));
            }
        }
        Ok(())
    }
}

/// Check a version is `X.Y.Z`.
pub(crate) fn validate_version(version: &str) -> Result<(), CliError> {
    if VERSION_RE.is_match(version) {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "Version must be in format X.Y.Z, got {version}"
        )))
    }
}

/// Check an alias uses only lowercase letters, digits, `-` and `_`.
pub(crate) fn validate_alias(alias: &str) -> Result<(), CliError> {
    if ALIAS_RE.is_match(alias) {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "Alias must only contain lowercase letters, numbers, hyphens, and underscores, got {alias}"
        )))
    }
}

/// Declare mike as the version provider unless `mkdocs.yml` mentions
/// versioning already.
///
/// Returns whether the file was changed. A missing file is left alone.
pub(crate) fn ensure_version_provider(mkdocs_file: &Path) -> Result<bool, CliError> {
    if !mkdocs_file.is_file() {
        return Ok(false);
    }
    let content = fs::read_to_string(mkdocs_file)?;
    if content.contains("version:") || content.contains("mike") {
        return Ok(false);
    }

    OpenOptions::new()
        .append(true)
        .open(mkdocs_file)?
        .write_all(VERSION_PROVIDER_BLOCK.as_bytes())?;
    tracing::info!(path = %mkdocs_file.display(), "Added mike version provider");
    Ok(true)
}

/// Build the site and deploy it under `version`.
pub(crate) fn deploy(
    runner: &impl ToolRunner,
    version: &str,
    alias: Option<&str>,
    update_aliases: bool,
    site_dir: Option<&Path>,
) -> Result<(), CliError> {
    validate_version(version)?;
    if let Some(alias) = alias {
        validate_alias(alias)?;
    }

    runner.run("mkdocs", &args(["build", "--clean"]), site_dir)?;

    let mut deploy_args = args(["deploy", "--push", version]);
    deploy_args.extend(alias.map(str::to_owned));
    if update_aliases {
        deploy_args.push("--update-aliases".to_owned());
    }
    runner.run("mike", &deploy_args, site_dir)?;

    if alias == Some(DEFAULT_ALIAS) {
        runner.run("mike", &args(["set-default", "--push", DEFAULT_ALIAS]), site_dir)?;
    }
    Ok(())
}

/// Deployed versions as printed by mike.
pub(crate) fn list(runner: &impl ToolRunner, site_dir: Option<&Path>) -> Result<String, CliError> {
    runner.run("mike", &args(["list"]), site_dir)
}

/// Delete a deployed version or alias.
pub(crate) fn delete(
    runner: &impl ToolRunner,
    version: &str,
    site_dir: Option<&Path>,
) -> Result<(), CliError> {
    if version.trim().is_empty() {
        return Err(CliError::Validation("Version cannot be empty".to_owned()));
    }
    runner.run("mike", &args(["delete", "--push", version]), site_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tool::testing::RecordingRunner;

    #[test]
    fn test_validate_version() {
        assert!(validate_version("1.2.3").is_ok());
        assert!(validate_version("10.0.42").is_ok());
        for bad in ["1.2", "v1.2.3", "1.2.3-rc1", "", "1..3"] {
            assert!(validate_version(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_alias() {
        for good in ["latest", "stable", "release_2", "pre-release"] {
            assert!(validate_alias(good).is_ok(), "{good} should be accepted");
        }
        for bad in ["Latest", "with space", "", "a.b"] {
            assert!(validate_alias(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_deploy_latest_sets_default() {
        let runner = RecordingRunner::new();

        deploy(&runner, "1.0.0", Some("latest"), true, None).unwrap();

        assert_eq!(
            runner.command_lines(),
            [
                "mkdocs build --clean",
                "mike deploy --push 1.0.0 latest --update-aliases",
                "mike set-default --push latest",
            ]
        );
    }

    #[test]
    fn test_deploy_without_alias() {
        let runner = RecordingRunner::new();
        let dir = Path::new("/project");

        deploy(&runner, "2.1.0", None, false, Some(dir)).unwrap();

        assert_eq!(
            runner.command_lines(),
            ["mkdocs build --clean", "mike deploy --push 2.1.0"]
        );
        assert!(runner.calls().iter().all(|c| c.cwd.as_deref() == Some(dir)));
    }

    #[test]
    fn test_deploy_rejects_bad_version_before_running_tools() {
        let runner = RecordingRunner::new();

        let err = deploy(&runner, "1.0", None, false, None).unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_deploy_stops_when_build_fails() {
        let runner = RecordingRunner::new().failing("mkdocs build");

        let err = deploy(&runner, "1.0.0", Some("latest"), false, None).unwrap_err();

        assert!(matches!(err, CliError::Tool { .. }));
        assert_eq!(runner.command_lines(), ["mkdocs build --clean"]);
    }

    #[test]
    fn test_list_returns_mike_output() {
        let runner = RecordingRunner::new().with_output("mike list", "1.0.0 [latest]\n0.9.0\n");

        assert_eq!(list(&runner, None).unwrap(), "1.0.0 [latest]\n0.9.0\n");
    }

    #[test]
    fn test_delete_accepts_alias() {
        let runner = RecordingRunner::new();

        delete(&runner, "stable", None).unwrap();

        assert_eq!(runner.command_lines(), ["mike delete --push stable"]);
    }

    #[test]
    fn test_version_provider_appended_once() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mkdocs.yml");
        fs::write(&path, "site_name: Handbook").unwrap();

        assert!(ensure_version_provider(&path).unwrap());
        assert!(!ensure_version_provider(&path).unwrap());

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "site_name: Handbook\n\n# Version provider\nextra:\n  version:\n    provider: mike\n"
        );
    }

    #[test]
    fn test_version_provider_kept_when_configured() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mkdocs.yml");
        let content = "site_name: Handbook\nplugins:\n  - mike\n";
        fs::write(&path, content).unwrap();

        assert!(!ensure_version_provider(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_version_provider_skips_missing_file() {
        assert!(!ensure_version_provider(Path::new("/nonexistent/mkdocs.yml")).unwrap());
    }

    #[test]
    fn test_site_dir_of_bare_filename() {
        let site = SiteArgs {
            mkdocs_file: PathBuf::from("mkdocs.yml"),
        };

        assert_eq!(site.site_dir(), None);
    }
}

//! `confpub convert` command implementation.
//!
//! Converts Word documents into MkDocs pages with `pandoc`: GitHub-flavored
//! markdown for the body, the document properties as YAML front matter, and
//! embedded images extracted next to the output.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use clap::Args;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;
use crate::output::Output;
use crate::tool::{SystemRunner, ToolRunner, args};

/// Heading markers with no space before the text.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\n)#+([^\s#])").unwrap());

/// Bullet markers with no space before the text. Emphasis (`**`) and rules
/// (`---`) are left alone.
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\n)[*-]([^\s*-])").unwrap());

/// Image links into the Word package.
static WORD_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\(word/(.*?)\)").unwrap());

/// Directory (inside the output directory) receiving extracted media.
const IMAGES_DIR: &str = "images";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Directory containing Word documents.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the markdown files.
    #[arg(short, long)]
    output: PathBuf,
}

impl ConvertArgs {
    /// Execute the convert command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let runner = SystemRunner;
        let today = Local::now().date_naive();

        fs::create_dir_all(&self.output)?;
        let documents = find_documents(&self.input)?;
        if documents.is_empty() {
            output.warning(&format!(
                "No Word documents found in {}",
                self.input.display()
            ));
            return Ok(());
        }

        for document in &documents {
            let target = convert_document(&runner, document, &self.output, today)?;
            output.info(&format!(
                "Converted: {} -> {}",
                document.display(),
                target.display()
            ));
        }
        output.success(&format!("Converted {} document(s)", documents.len()));
        Ok(())
    }
}

/// Front matter written at the top of each converted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DocumentMetadata {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) date: String,
    pub(crate) summary: String,
}

impl DocumentMetadata {
    /// Build metadata from the `meta` object of pandoc's JSON output.
    ///
    /// Missing properties fall back to the file stem, `Unknown`, `today`
    /// and an empty summary.
    pub(crate) fn from_pandoc(meta: &Value, stem: &str, today: NaiveDate) -> Self {
        let field = |name: &str| {
            meta.get(name)
                .map(stringify)
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        };
        let date = field("date")
            .and_then(|d| parse_date(&d))
            .unwrap_or(today);

        Self {
            title: field("title").unwrap_or_else(|| stem.to_owned()),
            author: field("author").unwrap_or_else(|| "Unknown".to_owned()),
            date: date.format(DATE_FORMAT).to_string(),
            summary: field("description")
                .or_else(|| field("abstract"))
                .unwrap_or_default(),
        }
    }

    /// Render as a YAML front matter block.
    pub(crate) fn front_matter(&self) -> Result<String, CliError> {
        Ok(format!("---\n{}---\n\n", serde_yaml::to_string(self)?))
    }
}

/// Plain text of a pandoc JSON value (metadata or inline list).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect(),
        Value::Object(node) => match node.get("t").and_then(Value::as_str) {
            Some("Space" | "SoftBreak" | "LineBreak") => " ".to_owned(),
            Some("MetaList") => node
                .get("c")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(stringify).collect::<Vec<_>>().join(", "))
                .unwrap_or_default(),
            _ => node.get("c").map(stringify).unwrap_or_default(),
        },
        _ => String::new(),
    }
}

/// Accept `YYYY-MM-DD`, optionally followed by a time.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// Tidy pandoc's markdown for MkDocs.
pub(crate) fn clean_markdown(markdown: &str) -> String {
    let markdown = HEADING_RE.replace_all(markdown, "${1}## ${2}");
    let markdown = BULLET_RE.replace_all(&markdown, "${1}* ${2}");
    WORD_IMAGE_RE
        .replace_all(&markdown, format!("![${{1}}]({IMAGES_DIR}/${{2}})").as_str())
        .into_owned()
}

/// Word documents in `dir`, sorted by name. Office lock files (`~$...`) are
/// skipped.
pub(crate) fn find_documents(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut documents: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            path.is_file() && name.ends_with(".docx") && !name.starts_with("~$")
        })
        .collect();
    documents.sort();
    Ok(documents)
}

/// Convert one document into `output_dir/<stem>.md`.
pub(crate) fn convert_document(
    runner: &impl ToolRunner,
    docx: &Path,
    output_dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, CliError> {
    let source = std::path::absolute(docx)?.to_string_lossy().into_owned();
    let stem = docx
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let json = runner.run(
        "pandoc",
        &args(["--from=docx", "--to=json", source.as_str()]),
        None,
    )?;
    let document: Value = serde_json::from_str(&json)?;
    let metadata = DocumentMetadata::from_pandoc(
        document.get("meta").unwrap_or(&Value::Null),
        &stem,
        today,
    );

    let extract_media = format!("--extract-media={IMAGES_DIR}");
    let markdown = runner.run(
        "pandoc",
        &args([
            "--from=docx",
            "--to=gfm",
            "--wrap=none",
            extract_media.as_str(),
            source.as_str(),
        ]),
        Some(output_dir),
    )?;

    let target = output_dir.join(format!("{stem}.md"));
    let content = format!("{}{}", metadata.front_matter()?, clean_markdown(&markdown));
    fs::write(&target, content)?;
    tracing::debug!(source = %docx.display(), target = %target.display(), "Converted document");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::tool::testing::RecordingRunner;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_clean_markdown_headings() {
        assert_eq!(
            clean_markdown("#Intro\ntext\n###Details\n# Fine"),
            "## Intro\ntext\n## Details\n# Fine"
        );
    }

    #[test]
    fn test_clean_markdown_bullets() {
        assert_eq!(
            clean_markdown("-one\n*two\n- three\n**bold**\n---"),
            "* one\n* two\n- three\n**bold**\n---"
        );
    }

    #[test]
    fn test_clean_markdown_image_paths() {
        assert_eq!(
            clean_markdown("See ![chart](word/media/image1.png) and ![](images/x.png)"),
            "See ![chart](images/media/image1.png) and ![](images/x.png)"
        );
    }

    #[test]
    fn test_metadata_from_core_properties() {
        let meta = json!({
            "title": {"t": "MetaInlines", "c": [
                {"t": "Str", "c": "Release"}, {"t": "Space"}, {"t": "Str", "c": "Notes"}
            ]},
            "author": {"t": "MetaList", "c": [
                {"t": "MetaInlines", "c": [{"t": "Str", "c": "Ada"}]},
                {"t": "MetaInlines", "c": [{"t": "Str", "c": "Grace"}]}
            ]},
            "date": {"t": "MetaInlines", "c": [{"t": "Str", "c": "2024-05-01T09:30:00Z"}]},
            "description": {"t": "MetaInlines", "c": [{"t": "Str", "c": "Summary."}]}
        });

        let metadata = DocumentMetadata::from_pandoc(&meta, "release-notes", today());

        assert_eq!(
            metadata,
            DocumentMetadata {
                title: "Release Notes".to_owned(),
                author: "Ada, Grace".to_owned(),
                date: "2024-05-01".to_owned(),
                summary: "Summary.".to_owned(),
            }
        );
    }

    #[test]
    fn test_metadata_fallbacks() {
        let metadata = DocumentMetadata::from_pandoc(&json!({}), "handbook", today());

        assert_eq!(
            metadata,
            DocumentMetadata {
                title: "handbook".to_owned(),
                author: "Unknown".to_owned(),
                date: "2026-03-14".to_owned(),
                summary: String::new(),
            }
        );
    }

    #[test]
    fn test_unparseable_date_uses_today() {
        let meta = json!({"date": {"t": "MetaString", "c": "last spring"}});

        let metadata = DocumentMetadata::from_pandoc(&meta, "x", today());

        assert_eq!(metadata.date, "2026-03-14");
    }

    #[test]
    fn test_front_matter_is_valid_yaml() {
        let metadata = DocumentMetadata {
            title: "Ops: Runbook".to_owned(),
            author: "Unknown".to_owned(),
            date: "2026-03-14".to_owned(),
            summary: String::new(),
        };

        let front_matter = metadata.front_matter().unwrap();

        assert!(front_matter.starts_with("---\n"));
        assert!(front_matter.ends_with("---\n\n"));
        let yaml = front_matter.trim_start_matches("---\n").trim_end_matches("---\n\n");
        let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["title"].as_str(), Some("Ops: Runbook"));
        assert_eq!(parsed["summary"].as_str(), Some(""));
    }

    #[test]
    fn test_find_documents_skips_lock_files() {
        let temp = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.docx", "~$a.docx", "notes.txt"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }
        fs::create_dir(temp.path().join("dir.docx")).unwrap();

        let documents = find_documents(temp.path()).unwrap();

        assert_eq!(
            documents,
            [temp.path().join("a.docx"), temp.path().join("b.docx")]
        );
    }

    #[test]
    fn test_convert_document_writes_page() {
        let temp = tempfile::tempdir().unwrap();
        let docx = temp.path().join("Guide.docx");
        fs::write(&docx, b"x").unwrap();
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        let runner = RecordingRunner::new()
            .with_output(
                "--to=json",
                r#"{"pandoc-api-version":[1,23],"meta":{"title":{"t":"MetaInlines","c":[{"t":"Str","c":"Guide"}]}},"blocks":[]}"#,
            )
            .with_output("--to=gfm", "#Setup\n\n-step\n");

        let target = convert_document(&runner, &docx, &out, today()).unwrap();

        assert_eq!(target, out.join("Guide.md"));
        let content = fs::read_to_string(&target).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("title: Guide\n"));
        assert!(content.contains("author: Unknown\n"));
        assert!(content.ends_with("---\n\n## Setup\n\n* step\n"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].cwd.as_deref(), Some(out.as_path()));
        assert!(calls[1].args.contains(&"--extract-media=images".to_owned()));
    }

    #[test]
    fn test_convert_document_propagates_tool_failure() {
        let temp = tempfile::tempdir().unwrap();
        let docx = temp.path().join("Broken.docx");
        fs::write(&docx, b"x").unwrap();
        let runner = RecordingRunner::new().failing("pandoc");

        let err = convert_document(&runner, &docx, temp.path(), today()).unwrap_err();

        assert!(matches!(err, CliError::Tool { .. }));
        assert!(!temp.path().join("Broken.md").exists());
    }
}

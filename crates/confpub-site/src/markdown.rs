//! Markdown to HTML rendering.
//!
//! Renders page sources the way the site generator would before publishing:
//! YAML front matter is dropped, `!!! kind "Title"` admonitions become
//! `<div class="admonition kind">` blocks, and everything else goes through
//! `pulldown-cmark` with tables, footnotes, strikethrough and task lists.

use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::Regex;

static ADMONITION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^!!!\s+([\w-]+)(?:\s+"([^"]*)")?\s*$"#).unwrap());

static H1_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t#]*$").unwrap());

/// A document split at its front matter.
#[derive(Debug, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Raw YAML between the `---` fences, if present.
    pub yaml: Option<&'a str>,
    /// Markdown following the front matter.
    pub body: &'a str,
}

/// Split off a leading `---` fenced YAML block.
pub fn split_front_matter(content: &str) -> FrontMatter<'_> {
    let unfenced = FrontMatter {
        yaml: None,
        body: content,
    };
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return unfenced;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return FrontMatter {
                yaml: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }
    unfenced
}

/// Extract the text of the first `# H1` heading.
pub fn extract_title(markdown: &str) -> Option<String> {
    H1_PATTERN
        .captures(markdown)
        .map(|caps| caps[1].trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// Derive a display title from a file stem (`getting-started` → `Getting started`).
pub fn title_from_stem(stem: &str) -> String {
    let spaced = stem.replace(['-', '_'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One piece of a page: plain markdown or an admonition block.
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Markdown(String),
    Admonition {
        kind: String,
        title: Option<String>,
        body: String,
    },
}

/// Renders markdown page sources to HTML.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the extensions mkdocs sites commonly enable.
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }

    /// Render a page source (front matter allowed) to HTML.
    pub fn render(&self, content: &str) -> String {
        let body = split_front_matter(content).body;
        let mut out = String::with_capacity(body.len() * 2);
        self.render_segments(body, &mut out);
        out
    }

    fn render_segments(&self, markdown: &str, out: &mut String) {
        for segment in split_admonitions(markdown) {
            match segment {
                Segment::Markdown(text) => {
                    html::push_html(out, Parser::new_ext(&text, self.options));
                }
                Segment::Admonition { kind, title, body } => {
                    out.push_str(&format!("<div class=\"admonition {kind}\">\n"));
                    let title = title.unwrap_or_else(|| title_from_stem(&kind));
                    if !title.is_empty() {
                        out.push_str(&format!(
                            "<p class=\"admonition-title\">{}</p>\n",
                            escape_html(&title)
                        ));
                    }
                    self.render_segments(&body, out);
                    out.push_str("</div>\n");
                }
            }
        }
    }
}

/// Split markdown into plain runs and `!!!` admonition blocks.
///
/// An admonition body is every following line that is blank or indented by
/// four spaces (or a tab); trailing blank lines go back to the markdown run.
fn split_admonitions(markdown: &str) -> Vec<Segment> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = ADMONITION_START.captures(lines[i]) else {
            plain.push_str(lines[i]);
            plain.push('\n');
            i += 1;
            continue;
        };

        let mut end = i + 1;
        while end < lines.len() && (lines[end].trim().is_empty() || is_indented(lines[end])) {
            end += 1;
        }
        while end > i + 1 && lines[end - 1].trim().is_empty() {
            end -= 1;
        }

        let body: String = lines[i + 1..end]
            .iter()
            .map(|line| format!("{}\n", dedent(line)))
            .collect();

        if !plain.is_empty() {
            segments.push(Segment::Markdown(std::mem::take(&mut plain)));
        }
        segments.push(Segment::Admonition {
            kind: caps[1].to_lowercase(),
            title: caps.get(2).map(|m| m.as_str().to_owned()),
            body,
        });
        i = end;
    }

    if !plain.is_empty() {
        segments.push(Segment::Markdown(plain));
    }
    segments
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn dedent(line: &str) -> &str {
    line.strip_prefix("    ")
        .or_else(|| line.strip_prefix('\t'))
        .unwrap_or(line.trim_start())
}

fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

//! HTML to Confluence storage format conversion.
//!
//! Rendered page HTML goes through a fixed chain of rewrites:
//!
//! 1. Sanitize: comments, broken image remnants and draw.io exports are
//!    removed, runs of blank lines collapsed.
//! 2. Code blocks become `code` macros. Languages Confluence cannot
//!    highlight are swapped for close ones.
//! 3. Tables get the `wrapped` class.
//! 4. Note and warning admonitions become `info` and `warning` macros.
//! 5. Images become attachment images (local files) or URL images.
//! 6. Links to mapped documents become page links.
//!
//! Each step assumes the markup left by the previous ones, so the order is
//! fixed. Code macros are held back as NUL-delimited placeholders between
//! steps 2 and 6 so later rewrites never see code text. NUL bytes are
//! stripped while sanitizing, so page text cannot produce a placeholder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use confpub_confluence::RemotePageRef;
use confpub_site::LeafPage;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use crate::paths::{normalize, resolve_doc_path};
use crate::sync::PathToPageMap;

/// Body pushed instead of a page whose content is empty after sanitizing.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "<p>Content could not be processed.</p>";

/// Code languages rewritten to one Confluence highlights.
pub const LANGUAGE_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("json", "yaml"),
    ("dockerfile", "bash"),
    ("powershell", "bash"),
];

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static EMPTY_SRC_IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*\ssrc=""[^>]*>"#).unwrap());

/// `<img ...></img>` pairs left behind by diagram exports.
static CLOSED_IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img[^>]*>\s*</img>").unwrap());

static MXFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<mxfile\b.*?</mxfile>").unwrap());

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// Pygments output (`codehilite` or `highlight` wrapper), optional language.
static HIGHLIGHTED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="(?:codehilite|highlight)"><pre><span></span><code(?: class="language-([\w+#.-]+)")?>(.*?)</code></pre></div>"#,
    )
    .unwrap()
});

/// Plain fenced code, optional language.
static PLAIN_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="language-([\w+#.-]+)")?>(.*?)</code></pre>"#).unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static CODE_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x00CODE_BLOCK_(\d+)\x00").unwrap());

/// Note or warning admonition with a plain-text title.
///
/// The body never contains `<d...` or `</d...` tags, so a match cannot run
/// past its own `</div>`. Bodies holding nested divs stay untouched.
static ADMONITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<div class="admonition (note|warning)">\s*(?:<p class="admonition-title">[^<]*</p>\s*)?((?:[^<]|<[^/d]|</[^d])*?)\s*</div>"#,
    )
    .unwrap()
});

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img\s[^>]*>").unwrap());

static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\ssrc="([^"]*)""#).unwrap());

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a\s[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());

/// A page converted to Confluence storage format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedPage {
    /// Storage-format body.
    pub storage: String,
    /// Absolute paths of local images to attach, one per filename.
    pub attachments: Vec<PathBuf>,
}

impl ConvertedPage {
    fn placeholder() -> Self {
        Self {
            storage: EMPTY_CONTENT_PLACEHOLDER.to_owned(),
            attachments: Vec::new(),
        }
    }

    /// Whether the page had no content and carries the placeholder body.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.storage == EMPTY_CONTENT_PLACEHOLDER
    }
}

/// Convert rendered page HTML to Confluence storage format.
///
/// `page` locates relative image sources and link targets; `pages` decides
/// which links point at published documents.
#[must_use]
pub fn convert_page(html: &str, page: &LeafPage, pages: &PathToPageMap) -> ConvertedPage {
    let html = sanitize(html);
    if html.trim().is_empty() {
        return ConvertedPage::placeholder();
    }

    let mut code_blocks = Vec::new();
    let html = convert_code_blocks(&html, &mut code_blocks);
    let html = wrap_tables(&html);
    let html = convert_admonitions(&html);
    let mut attachments = Vec::new();
    let html = convert_images(&html, &page.abs_src_path, &mut attachments);
    let html = convert_links(&html, &page.src_path, pages);
    let storage = restore_code_blocks(&html, &code_blocks);

    ConvertedPage {
        storage,
        attachments,
    }
}

fn sanitize(html: &str) -> String {
    let html = html.replace('\0', "");
    let html = COMMENT_RE.replace_all(&html, "");
    let html = EMPTY_SRC_IMG_RE.replace_all(&html, "");
    let html = CLOSED_IMG_RE.replace_all(&html, "");
    let html = MXFILE_RE.replace_all(&html, "");
    BLANK_LINES_RE.replace_all(&html, "\n\n").into_owned()
}

fn convert_code_blocks(html: &str, code_blocks: &mut Vec<String>) -> String {
    let html =
        HIGHLIGHTED_CODE_RE.replace_all(html, |caps: &Captures| stash_code(caps, code_blocks));
    PLAIN_CODE_RE
        .replace_all(&html, |caps: &Captures| stash_code(caps, code_blocks))
        .into_owned()
}

fn stash_code(caps: &Captures, code_blocks: &mut Vec<String>) -> String {
    let language = caps.get(1).map(|m| m.as_str());
    code_blocks.push(code_macro(language, &code_text(&caps[2])));
    format!("\0CODE_BLOCK_{}\0", code_blocks.len() - 1)
}

/// Literal code text from highlighted markup.
fn code_text(raw: &str) -> String {
    let text = TAG_RE.replace_all(raw, "");
    text.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}

fn code_macro(language: Option<&str>, code: &str) -> String {
    let language = language
        .map(|lang| language_parameter(substitute_language(&lang.to_ascii_lowercase())))
        .unwrap_or_default();
    // CDATA cannot contain its own terminator.
    let code = code.replace("]]>", "]]]]><![CDATA[>");
    format!(
        r#"<ac:structured-macro ac:name="code">{language}<ac:plain-text-body><![CDATA[{code}]]></ac:plain-text-body></ac:structured-macro>"#
    )
}

/// Swap a language Confluence cannot highlight for a close one.
fn substitute_language(language: &str) -> &str {
    LANGUAGE_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == language)
        .map_or(language, |&(_, to)| to)
}

fn language_parameter(language: &str) -> String {
    format!(r#"<ac:parameter ac:name="language">{language}</ac:parameter>"#)
}

fn restore_code_blocks(html: &str, code_blocks: &[String]) -> String {
    CODE_PLACEHOLDER_RE
        .replace_all(html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| code_blocks.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

fn wrap_tables(html: &str) -> String {
    html.replace("<table>", r#"<table class="wrapped">"#)
}

fn convert_admonitions(html: &str) -> String {
    ADMONITION_RE
        .replace_all(html, |caps: &Captures| {
            let name = if &caps[1] == "note" { "info" } else { "warning" };
            let body = caps[2].trim();
            let body = if body.starts_with('<') {
                body.to_owned()
            } else {
                format!("<p>{body}</p>")
            };
            format!(
                r#"<ac:structured-macro ac:name="{name}"><ac:rich-text-body>{body}</ac:rich-text-body></ac:structured-macro>"#
            )
        })
        .into_owned()
}

fn convert_images(html: &str, abs_src_path: &Path, attachments: &mut Vec<PathBuf>) -> String {
    let source_dir = abs_src_path.parent().unwrap_or(Path::new("."));
    let mut filenames = HashSet::new();

    IMG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            let Some(src) = SRC_ATTR_RE.captures(tag).map(|c| c[1].to_owned()) else {
                return tag.to_owned();
            };
            if is_remote(&src) {
                return format!(r#"<ac:image><ri:url ri:value="{src}" /></ac:image>"#);
            }

            let local = src.split(['?', '#']).next().unwrap_or_default();
            let decoded = percent_decode_str(local).decode_utf8_lossy();
            let path = normalize(&source_dir.join(decoded.as_ref()));
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if filename.is_empty() || !path.is_file() {
                tracing::warn!(
                    src = %src,
                    path = %path.display(),
                    "Image not found, dropping reference"
                );
                return String::new();
            }

            if filenames.insert(filename.clone()) {
                attachments.push(path);
            }
            format!(
                r#"<ac:image><ri:attachment ri:filename="{}" /></ac:image>"#,
                escape_attr(&filename)
            )
        })
        .into_owned()
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
}

fn convert_links(html: &str, src_path: &str, pages: &PathToPageMap) -> String {
    if pages.is_empty() {
        return html.to_owned();
    }
    LINK_RE
        .replace_all(html, |caps: &Captures| {
            match resolve_link(&caps[1], src_path, pages) {
                Some((target, anchor)) => page_link(target, anchor, &caps[2]),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

/// Find the published page an `href` points at, with its fragment.
///
/// The target is tried relative to the linking page first, then as a
/// docs-root path.
fn resolve_link<'a>(
    href: &'a str,
    src_path: &str,
    pages: &'a PathToPageMap,
) -> Option<(&'a RemotePageRef, Option<&'a str>)> {
    if href.is_empty() || href.starts_with('#') || href.contains("://") || href.starts_with("mailto:")
    {
        return None;
    }
    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment).filter(|f| !f.is_empty())),
        None => (href, None),
    };
    let path = percent_decode_str(path).decode_utf8_lossy();

    let target = resolve_doc_path(src_path, &path)
        .and_then(|resolved| pages.get(&resolved))
        .or_else(|| pages.get(path.trim_start_matches("./")))?;
    tracing::debug!(href, page = %target, "Resolved internal link");
    Some((target, fragment))
}

fn page_link(target: &RemotePageRef, anchor: Option<&str>, text: &str) -> String {
    let anchor = anchor
        .map(|a| format!(r#" ac:anchor="{a}""#))
        .unwrap_or_default();
    let body = if text.trim().is_empty() {
        String::new()
    } else {
        format!("<ac:link-body>{text}</ac:link-body>")
    };
    format!(
        r#"<ac:link{anchor}><ri:page ri:content-title="{}" />{body}</ac:link>"#,
        escape_attr(&target.title)
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

//! Article template rendering and export file naming.
//!
//! # Responsibility
//! - Substitute record fields into the article document template.
//! - Format publish dates and tag link lists for the document.
//! - Map titles to export file names.
//!
//! # Invariants
//! - Placeholders are substituted in one pass; field values containing
//!   `{{...}}` text are emitted as-is and never re-expanded.
//! - Field values are interpolated verbatim (no HTML escaping). Only tag
//!   link targets are percent-encoded.
//! - Malformed dates fall back to the raw input instead of failing.

use crate::model::article::ArticleRecord;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/article.html");
const FILE_NAME_MAX_CHARS: usize = 50;
const FILE_NAME_SUFFIX: &str = ".html";
const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%Y年%m月%d日";

/// Characters `encodeURIComponent` leaves untouched besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([a-z]+)\}\}").expect("valid placeholder regex"));
static FILE_NAME_INVALID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9_\x{4E00}-\x{9FA5}]").expect("valid file name charset regex")
});
static UNDERSCORE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("valid underscore run regex"));

/// Document skeleton with `{{field}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTemplate {
    source: String,
}

impl Default for ArticleTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl ArticleTemplate {
    /// Wraps a template source. Recognized placeholders are `{{title}}`,
    /// `{{author}}`, `{{date}}`, `{{category}}`, `{{tags}}` and `{{content}}`;
    /// anything else is left untouched.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders `record` into a complete document.
    pub fn render(&self, record: &ArticleRecord) -> String {
        let date = format_date(&record.date);
        let tags = render_tag_links(&record.tags);
        PLACEHOLDER_RE
            .replace_all(&self.source, |caps: &Captures<'_>| {
                match &caps[1] {
                    "title" => record.title.clone(),
                    "author" => record.author.clone(),
                    "date" => date.clone(),
                    "category" => record.category.clone(),
                    "tags" => tags.clone(),
                    "content" => record.content.clone(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Renders `record` with the built-in article template.
pub fn render_article(record: &ArticleRecord) -> String {
    ArticleTemplate::default().render(record)
}

/// Formats `YYYY-MM-DD` as `YYYY年MM月DD日`.
///
/// Empty input yields an empty string; unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, INPUT_DATE_FORMAT) {
        Ok(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Renders one link per tag in record order; no tags yields `""`.
pub fn render_tag_links(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            format!(
                r#"<a href="index.html?tag={}">{}</a>"#,
                utf8_percent_encode(tag, URI_COMPONENT),
                tag
            )
        })
        .collect()
}

/// Derives the export file name for a title.
///
/// Lowercases, replaces every char outside `[a-z0-9_]` and the CJK range
/// U+4E00..=U+9FA5 with `_`, collapses underscore runs, keeps the first 50
/// chars and appends `.html`.
pub fn file_name(title: &str) -> String {
    let lowered = title.to_lowercase();
    let replaced = FILE_NAME_INVALID_RE.replace_all(&lowered, "_");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&replaced, "_");
    let mut name: String = collapsed.chars().take(FILE_NAME_MAX_CHARS).collect();
    name.push_str(FILE_NAME_SUFFIX);
    name
}

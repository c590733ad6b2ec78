//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical article record persisted by stores and read by
//!   the HTML renderer.
//! - Own record-level validation rules shared by editing and service layers.
//!
//! # Invariants
//! - `id` is assigned once on first save and never changes afterwards.
//! - `tags` holds at most [`MAX_TAGS`] entries with no duplicate text.
//! - Required fields are non-empty before a record reaches a store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque article identifier, unique within one collection.
pub type ArticleId = String;

/// Maximum number of tags one article may carry.
pub const MAX_TAGS: usize = 5;

const ARTICLE_ID_PREFIX: &str = "article_";

/// Generates a fresh, collision-improbable article id.
pub fn generate_article_id() -> ArticleId {
    format!("{ARTICLE_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// One blog post: structured metadata plus a rich-text body.
///
/// Serialized with camelCase keys. Optional fields are omitted when absent
/// and default to `None` when missing, so older blobs keep loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Absent until the first successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArticleId>,
    pub title: String,
    pub author: String,
    /// Calendar date, expected as `YYYY-MM-DD`. Stored raw.
    pub date: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Rich-text markup, trusted verbatim.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Name of the exported HTML file, set after export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Validation failures for article records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    /// A required field is empty or whitespace-only.
    MissingField(&'static str),
    /// More than [`MAX_TAGS`] tags.
    TooManyTags(usize),
    /// Same tag text appears twice.
    DuplicateTag(String),
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::TooManyTags(count) => {
                write!(f, "article has {count} tags; at most {MAX_TAGS} are allowed")
            }
            Self::DuplicateTag(tag) => write!(f, "duplicate tag `{tag}`"),
        }
    }
}

impl Error for ArticleValidationError {}

impl ArticleRecord {
    /// Creates an unsaved record with the required fields filled in.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            date: date.into(),
            category: category.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper replacing the tag list.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The assigned id, treating blank or whitespace-only ids as unassigned.
    pub fn saved_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Checks required fields and tag rules.
    ///
    /// Fields are checked in form order (`title`, `author`, `date`,
    /// `category`, `content`) and the first failure is returned.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        let required = [
            ("title", &self.title),
            ("author", &self.author),
            ("date", &self.date),
            ("category", &self.category),
            ("content", &self.content),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ArticleValidationError::MissingField(field));
            }
        }

        if self.tags.len() > MAX_TAGS {
            return Err(ArticleValidationError::TooManyTags(self.tags.len()));
        }
        for (idx, tag) in self.tags.iter().enumerate() {
            if self.tags[..idx].contains(tag) {
                return Err(ArticleValidationError::DuplicateTag(tag.clone()));
            }
        }

        Ok(())
    }

    /// Case-insensitive substring match over title, content, category and
    /// tags. An empty keyword matches every record.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return true;
        }
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_article_id, ArticleRecord, ArticleValidationError, MAX_TAGS};

    fn sample() -> ArticleRecord {
        ArticleRecord::new("Title", "Me", "2024-06-05", "Tech", "<p>body</p>")
    }

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let first = generate_article_id();
        let second = generate_article_id();
        assert!(first.starts_with("article_"));
        assert_ne!(first, second);
    }

    #[test]
    fn blank_ids_count_as_unassigned() {
        let mut record = sample();
        assert_eq!(record.saved_id(), None);
        record.id = Some("  ".to_string());
        assert_eq!(record.saved_id(), None);
        record.id = Some(" article_1 ".to_string());
        assert_eq!(record.saved_id(), Some("article_1"));
    }

    #[test]
    fn validate_reports_first_missing_field_in_form_order() {
        let mut record = sample();
        record.author = "  ".to_string();
        record.content.clear();
        assert_eq!(
            record.validate(),
            Err(ArticleValidationError::MissingField("author"))
        );
    }

    #[test]
    fn validate_enforces_tag_limit_and_uniqueness() {
        let too_many = sample().with_tags((0..=MAX_TAGS).map(|i| format!("t{i}")));
        assert_eq!(
            too_many.validate(),
            Err(ArticleValidationError::TooManyTags(MAX_TAGS + 1))
        );

        let duplicated = sample().with_tags(["rust", "web", "rust"]);
        assert_eq!(
            duplicated.validate(),
            Err(ArticleValidationError::DuplicateTag("rust".to_string()))
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive_across_fields() {
        let record = sample().with_tags(["Rust"]);
        assert!(record.matches_keyword("TITLE"));
        assert!(record.matches_keyword("rus"));
        assert!(record.matches_keyword("tech"));
        assert!(record.matches_keyword("BODY"));
        assert!(!record.matches_keyword("python"));
    }

    #[test]
    fn missing_optional_fields_deserialize_as_absent() {
        let json = r#"{"title":"a","author":"b","date":"2024-01-01","category":"c","content":"d"}"#;
        let record: ArticleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.excerpt, None);
        assert_eq!(record.file_path, None);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn serializes_file_path_as_camel_case() {
        let mut record = sample();
        record.file_path = Some("title.html".to_string());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"filePath\":\"title.html\""));
        assert!(!json.contains("excerpt"));
    }
}

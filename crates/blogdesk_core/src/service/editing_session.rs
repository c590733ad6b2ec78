//! Per-edit form state.
//!
//! # Responsibility
//! - Own the tag list and form fields for one article being edited.
//! - Enforce tag rules at entry time and required fields at submit time.
//!
//! # Invariants
//! - The tag list never exceeds `MAX_TAGS` and never holds duplicates.
//! - A session is single-owner; nothing here is process-global.

use crate::model::article::{ArticleId, ArticleRecord, ArticleValidationError, MAX_TAGS};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected tag input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    Empty,
    Duplicate(String),
    LimitReached,
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tag cannot be empty"),
            Self::Duplicate(tag) => write!(f, "tag `{tag}` already exists"),
            Self::LimitReached => write!(f, "at most {MAX_TAGS} tags are allowed"),
        }
    }
}

impl Error for TagError {}

/// Form state for composing or editing one article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditingSession {
    /// Set when editing a saved article; `None` for a new draft.
    pub id: Option<ArticleId>,
    pub title: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub content: String,
    pub excerpt: String,
    tags: Vec<String>,
    /// Export file of the loaded article; carried through edits.
    file_path: Option<String>,
}

impl EditingSession {
    /// Starts an empty draft dated `today` (`YYYY-MM-DD`).
    pub fn new(today: impl Into<String>) -> Self {
        Self {
            date: today.into(),
            ..Self::default()
        }
    }

    /// Starts a session pre-filled from a stored record.
    pub fn load(record: &ArticleRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            date: record.date.clone(),
            category: record.category.clone(),
            content: record.content.clone(),
            excerpt: record.excerpt.clone().unwrap_or_default(),
            tags: record.tags.clone(),
            file_path: record.file_path.clone(),
        }
    }

    /// Export file name recorded on the loaded article, if any.
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Current tags in entry order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Appends a trimmed tag.
    pub fn add_tag(&mut self, text: &str) -> Result<(), TagError> {
        let tag = text.trim();
        if tag.is_empty() {
            return Err(TagError::Empty);
        }
        if self.tags.iter().any(|existing| existing == tag) {
            return Err(TagError::Duplicate(tag.to_string()));
        }
        if self.tags.len() >= MAX_TAGS {
            return Err(TagError::LimitReached);
        }
        self.tags.push(tag.to_string());
        Ok(())
    }

    /// Removes a tag by exact text. Returns whether it was present.
    pub fn remove_tag(&mut self, text: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| tag != text);
        self.tags.len() != before
    }

    /// Builds the record to submit, trimming id/title/author/excerpt.
    ///
    /// A blank id is dropped so the store assigns a fresh one.
    pub fn to_record(&self) -> Result<ArticleRecord, ArticleValidationError> {
        let excerpt = self.excerpt.trim();
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let record = ArticleRecord {
            id,
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            date: self.date.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            content: self.content.clone(),
            excerpt: (!excerpt.is_empty()).then(|| excerpt.to_string()),
            file_path: self.file_path.clone(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Clears every field and re-dates the draft to `today`.
    pub fn reset(&mut self, today: impl Into<String>) {
        *self = Self::new(today);
    }
}

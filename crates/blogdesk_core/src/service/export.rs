//! Bulk JSON export of the article collection.

use crate::model::article::ArticleRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Format version written into every bundle.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Whole-collection export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub export_date: String,
    pub articles: Vec<ArticleRecord>,
}

impl ExportBundle {
    /// Wraps `articles` (in collection order) stamped with `now`.
    pub fn new(articles: Vec<ArticleRecord>, now: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            articles,
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reads a bundle produced by [`ExportBundle::to_json_pretty`].
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Download name for a bundle exported at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("blog_articles_export_{}.json", now.format("%Y-%m-%d"))
}

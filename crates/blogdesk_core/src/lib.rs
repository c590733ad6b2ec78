//! Core domain logic for blogdesk.
//! Article storage, HTML rendering and editing use-cases live here; front-ends
//! only compose these APIs.

pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{
    generate_article_id, ArticleId, ArticleRecord, ArticleValidationError, MAX_TAGS,
};
pub use render::article_html::{
    file_name, format_date, render_article, render_tag_links, ArticleTemplate,
};
pub use repo::article_repo::{
    ArticleStore, PersistenceError, SqliteArticleStore, StoreError, StoreResult,
    ARTICLES_SLOT_KEY, DEFAULT_QUOTA_BYTES,
};
pub use repo::memory_repo::InMemoryArticleStore;
pub use service::article_service::{ArticleService, SaveOutcome, ServiceError};
pub use service::editing_session::{EditingSession, TagError};
pub use service::export::{export_file_name, ExportBundle, EXPORT_FORMAT_VERSION};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Static HTML generation for articles.
//!
//! # Responsibility
//! - Turn an `ArticleRecord` into a standalone HTML document.
//! - Derive deterministic export file names from titles.
//!
//! # Invariants
//! - Rendering is pure: no store access, no record mutation.

pub mod article_html;

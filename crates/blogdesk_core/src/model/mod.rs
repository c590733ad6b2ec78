//! Domain model for blog articles.
//!
//! # Responsibility
//! - Define canonical data structures shared by stores, renderer and
//!   editing sessions.
//!
//! # Invariants
//! - Every saved article is identified by a stable `ArticleId`.

pub mod article;

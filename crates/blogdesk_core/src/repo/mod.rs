//! Article store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the `ArticleStore` capability used by services and the CLI.
//! - Provide a SQLite slot-backed store and a process-local store with the
//!   same contract; callers pick one at construction time.
//!
//! # Invariants
//! - A new record is prepended; an update keeps its position.
//! - Every mutation replaces the whole serialized collection or nothing.
//! - Absent ids are data, never errors.

pub mod article_repo;
pub mod memory_repo;

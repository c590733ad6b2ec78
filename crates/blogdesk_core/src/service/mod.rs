//! Core use-case services.
//!
//! # Responsibility
//! - Compose stores and the renderer into editing/publishing use-cases.
//! - Keep CLI and other front-ends decoupled from storage details.

pub mod article_service;
pub mod editing_session;
pub mod export;

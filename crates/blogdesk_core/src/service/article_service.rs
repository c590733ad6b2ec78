//! Article use-case service.
//!
//! # Responsibility
//! - Validate submitted records before they reach the store.
//! - Save, render and write exported HTML in one use-case call.
//! - Produce bulk JSON exports of the collection.
//!
//! # Invariants
//! - The store never sees a record that failed validation.
//! - Store and renderer stay independent; this service composes them.

use crate::model::article::{ArticleId, ArticleRecord, ArticleValidationError};
use crate::render::article_html::{file_name, ArticleTemplate};
use crate::repo::article_repo::{ArticleStore, StoreError, StoreResult};
use crate::service::export::{export_file_name, ExportBundle};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Service error for article use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Record failed required-field or tag checks.
    Validation(ArticleValidationError),
    /// Store write failed.
    Store(StoreError),
    /// Export file could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Bulk export could not be encoded.
    Export(serde_json::Error),
    /// Bulk export requested on an empty collection.
    NothingToExport,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::Export(err) => write!(f, "failed to encode export: {err}"),
            Self::NothingToExport => write!(f, "no articles to export"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Export(err) => Some(err),
            Self::NothingToExport => None,
        }
    }
}

impl From<ArticleValidationError> for ServiceError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of saving and exporting one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: ArticleId,
    /// Bare file name recorded in `file_path`.
    pub file_name: String,
    /// Full path the HTML document was written to.
    pub path: PathBuf,
}

/// Article service facade over one store.
pub struct ArticleService<S: ArticleStore> {
    store: S,
    template: ArticleTemplate,
}

impl<S: ArticleStore> ArticleService<S> {
    /// Creates a service rendering with the built-in template.
    pub fn new(store: S) -> Self {
        Self::with_template(store, ArticleTemplate::default())
    }

    /// Creates a service rendering with `template`.
    pub fn with_template(store: S, template: ArticleTemplate) -> Self {
        Self { store, template }
    }

    /// Gives the store back, e.g. to reuse a borrowed connection.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and upserts `record`, returning its id.
    pub fn save(&mut self, record: &ArticleRecord) -> Result<ArticleId, ServiceError> {
        record.validate()?;
        Ok(self.store.upsert(record)?)
    }

    /// Saves `record`, writes its HTML document into `out_dir` and records
    /// the file name on the stored article.
    ///
    /// The record is stored before the file is written, so an I/O failure
    /// leaves a saved article without `file_path`.
    pub fn save_and_generate(
        &mut self,
        record: &ArticleRecord,
        out_dir: &Path,
    ) -> Result<SaveOutcome, ServiceError> {
        let id = self.save(record)?;

        let mut stored = record.clone();
        stored.id = Some(id.clone());
        let name = file_name(&stored.title);
        let path = out_dir.join(&name);
        let html = self.template.render(&stored);
        write_file(&path, &html)?;

        stored.file_path = Some(name.clone());
        self.store.upsert(&stored)?;
        info!(
            "event=article_publish module=service status=ok id={} file={} bytes={}",
            id,
            name,
            html.len()
        );

        Ok(SaveOutcome {
            id,
            file_name: name,
            path,
        })
    }

    /// Renders `record` without touching the store.
    pub fn preview(&self, record: &ArticleRecord) -> String {
        self.template.render(record)
    }

    /// Lists every stored article in collection order.
    pub fn list(&self) -> Vec<ArticleRecord> {
        self.store.get_all()
    }

    /// Gets one article by id.
    pub fn get(&self, id: &str) -> Option<ArticleRecord> {
        self.store.get_by_id(id)
    }

    /// Deletes one article by id; absent ids succeed.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        self.store.delete_by_id(id)
    }

    /// Keyword search; empty keyword lists everything.
    pub fn search(&self, keyword: &str) -> Vec<ArticleRecord> {
        self.store.search(keyword)
    }

    /// Builds the bulk export bundle stamped with `now`.
    pub fn export_bundle(&self, now: DateTime<Utc>) -> Result<ExportBundle, ServiceError> {
        let articles = self.store.get_all();
        if articles.is_empty() {
            return Err(ServiceError::NothingToExport);
        }
        Ok(ExportBundle::new(articles, now))
    }

    /// Writes the bulk export into `out_dir` and returns the file path.
    pub fn write_export(
        &self,
        out_dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, ServiceError> {
        let bundle = self.export_bundle(now)?;
        let json = bundle.to_json_pretty().map_err(ServiceError::Export)?;
        let path = out_dir.join(export_file_name(now));
        write_file(&path, &json)?;
        info!(
            "event=articles_export module=service status=ok count={} file={}",
            bundle.articles.len(),
            path.display()
        );
        Ok(path)
    }

    /// Replaces the collection with the articles of a bundle.
    pub fn restore(&mut self, bundle: ExportBundle) -> Result<usize, ServiceError> {
        let count = bundle.articles.len();
        self.store.replace_all(bundle.articles)?;
        info!("event=articles_restore module=service status=ok count={count}");
        Ok(count)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ServiceError> {
    let result = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|()| std::fs::write(path, contents));

    result.map_err(|source| {
        error!(
            "event=file_write module=service status=error path={} error={}",
            path.display(),
            source
        );
        ServiceError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

//! Article store contract and SQLite slot-backed implementation.
//!
//! # Responsibility
//! - Define `ArticleStore` CRUD/search APIs over one article collection.
//! - Keep the collection as a single JSON array inside one `kv_slots` row.
//! - Share collection encode/decode/upsert rules with the in-memory store.
//!
//! # Invariants
//! - Read-modify-write happens inside one call; a failed write leaves the
//!   stored collection untouched.
//! - A corrupt or unreadable blob reads as an empty collection.
//! - Serialized size must fit the configured quota.

use crate::db::{read_slot, remove_slot, write_slot, DbError};
use crate::model::article::{generate_article_id, ArticleId, ArticleRecord};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key holding the article collection.
pub const ARTICLES_SLOT_KEY: &str = "blogArticles";

/// Default serialized-collection quota, matching browser local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to durably write the collection.
#[derive(Debug)]
pub enum PersistenceError {
    /// Collection could not be encoded as JSON.
    Serialize(serde_json::Error),
    /// Encoded collection is larger than the store quota.
    QuotaExceeded { required: usize, quota: usize },
    /// Underlying SQLite write failed.
    Db(DbError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize articles: {err}"),
            Self::QuotaExceeded { required, quota } => write!(
                f,
                "storage quota exceeded: collection needs {required} bytes, quota is {quota} bytes"
            ),
            Self::Db(err) => write!(f, "storage write failed: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
            Self::Db(err) => Some(err),
        }
    }
}

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    Persistence(PersistenceError),
    /// Connection was not migrated before building a store.
    MissingRequiredTable(&'static str),
    /// Two records in a replacement collection share one id.
    DuplicateId(ArticleId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
            Self::DuplicateId(id) => write!(f, "duplicate article id `{id}` in collection"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Persistence(PersistenceError::Db(value))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

/// Capability interface for article collection management.
pub trait ArticleStore {
    /// Inserts a new record (prepended, fresh id) or replaces the record with
    /// the same id in place. Returns the record id.
    fn upsert(&mut self, record: &ArticleRecord) -> StoreResult<ArticleId>;
    /// Returns all records in collection order. Never fails.
    fn get_all(&self) -> Vec<ArticleRecord>;
    /// Exact id lookup.
    fn get_by_id(&self, id: &str) -> Option<ArticleRecord> {
        self.get_all()
            .into_iter()
            .find(|article| article.id.as_deref() == Some(id))
    }
    /// Removes the record with `id`. Reports success when absent too.
    fn delete_by_id(&mut self, id: &str) -> StoreResult<bool>;
    /// Case-insensitive keyword search; empty keyword returns everything.
    fn search(&self, keyword: &str) -> Vec<ArticleRecord> {
        self.get_all()
            .into_iter()
            .filter(|article| article.matches_keyword(keyword))
            .collect()
    }
    /// Replaces the whole collection, keeping the given order.
    ///
    /// Records without an id get a fresh one; duplicate ids are rejected
    /// with [`StoreError::DuplicateId`] and nothing is written.
    fn replace_all(&mut self, articles: Vec<ArticleRecord>) -> StoreResult<()>;
    /// Empties the collection.
    fn clear(&mut self) -> StoreResult<()>;
}

/// SQLite-backed store persisting the collection in one `kv_slots` row.
pub struct SqliteArticleStore<'conn> {
    conn: &'conn mut Connection,
    slot_key: String,
    quota_bytes: usize,
}

impl<'conn> SqliteArticleStore<'conn> {
    /// Builds a store over a migrated connection using the default slot key
    /// and quota.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_slot_table_ready(conn)?;
        Ok(Self {
            conn,
            slot_key: ARTICLES_SLOT_KEY.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        })
    }

    /// Uses another slot key, e.g. to keep drafts apart from published posts.
    pub fn with_slot_key(mut self, slot_key: impl Into<String>) -> Self {
        self.slot_key = slot_key.into();
        self
    }

    /// Overrides the serialized-collection quota.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Slot key this store reads and writes.
    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Reads the collection for a read-modify-write.
    ///
    /// Read failures are returned so a transient error never turns into an
    /// empty collection that gets written back. Corrupt JSON still decodes
    /// as empty.
    fn try_load(&self) -> StoreResult<Vec<ArticleRecord>> {
        let raw = read_slot(self.conn, &self.slot_key).map_err(PersistenceError::Db)?;
        Ok(raw
            .map(|raw| decode_collection(&raw, &self.slot_key))
            .unwrap_or_default())
    }

    fn load(&self) -> Vec<ArticleRecord> {
        match self.try_load() {
            Ok(articles) => articles,
            Err(err) => {
                warn!(
                    "event=articles_load module=store status=degraded slot={} reason=read_failed error={}",
                    self.slot_key, err
                );
                Vec::new()
            }
        }
    }

    fn commit(&mut self, articles: &[ArticleRecord]) -> StoreResult<()> {
        let encoded = encode_collection(articles, Some(self.quota_bytes))?;
        write_slot(self.conn, &self.slot_key, &encoded).map_err(PersistenceError::Db)?;
        debug!(
            "event=articles_commit module=store status=ok slot={} count={} bytes={}",
            self.slot_key,
            articles.len(),
            encoded.len()
        );
        Ok(())
    }
}

impl ArticleStore for SqliteArticleStore<'_> {
    fn upsert(&mut self, record: &ArticleRecord) -> StoreResult<ArticleId> {
        let mut articles = self.try_load()?;
        let (id, inserted) = upsert_into(&mut articles, record);
        self.commit(&articles)?;
        info!(
            "event=article_upsert module=store status=ok id={} inserted={} count={}",
            id,
            inserted,
            articles.len()
        );
        Ok(id)
    }

    fn get_all(&self) -> Vec<ArticleRecord> {
        self.load()
    }

    fn delete_by_id(&mut self, id: &str) -> StoreResult<bool> {
        let mut articles = self.try_load()?;
        let before = articles.len();
        articles.retain(|article| article.id.as_deref() != Some(id));
        if articles.len() != before {
            self.commit(&articles)?;
        }
        info!(
            "event=article_delete module=store status=ok id={} removed={}",
            id,
            before - articles.len()
        );
        Ok(true)
    }

    fn replace_all(&mut self, articles: Vec<ArticleRecord>) -> StoreResult<()> {
        let articles = prepare_replacement(articles)?;
        self.commit(&articles)
    }

    fn clear(&mut self) -> StoreResult<()> {
        remove_slot(self.conn, &self.slot_key)?;
        info!(
            "event=articles_clear module=store status=ok slot={}",
            self.slot_key
        );
        Ok(())
    }
}

/// Applies insert-or-replace rules to `articles`.
///
/// Returns the record id and whether it was inserted. A record carrying an
/// id unknown to the collection is inserted with that id; a blank id counts
/// as no id.
pub(crate) fn upsert_into(
    articles: &mut Vec<ArticleRecord>,
    record: &ArticleRecord,
) -> (ArticleId, bool) {
    if let Some(id) = record.saved_id() {
        let mut stored = record.clone();
        stored.id = Some(id.to_string());
        if let Some(existing) = articles
            .iter_mut()
            .find(|article| article.id.as_deref() == Some(id))
        {
            *existing = stored;
            return (id.to_string(), false);
        }
        articles.insert(0, stored);
        return (id.to_string(), true);
    }

    let id = unused_article_id(articles);
    let mut stored = record.clone();
    stored.id = Some(id.clone());
    articles.insert(0, stored);
    (id, true)
}

/// Assigns ids to id-less records and rejects duplicate ids.
pub(crate) fn prepare_replacement(
    mut articles: Vec<ArticleRecord>,
) -> StoreResult<Vec<ArticleRecord>> {
    let mut seen = HashSet::new();
    for article in &articles {
        if let Some(id) = article.saved_id() {
            if !seen.insert(id.to_string()) {
                return Err(StoreError::DuplicateId(id.to_string()));
            }
        }
    }

    for idx in 0..articles.len() {
        match articles[idx].saved_id().map(str::to_string) {
            Some(id) => articles[idx].id = Some(id),
            None => {
                let id = unused_article_id(&articles);
                articles[idx].id = Some(id);
            }
        }
    }
    Ok(articles)
}

fn unused_article_id(articles: &[ArticleRecord]) -> ArticleId {
    loop {
        let candidate = generate_article_id();
        if !articles
            .iter()
            .any(|article| article.id.as_deref() == Some(candidate.as_str()))
        {
            return candidate;
        }
    }
}

/// Serializes a collection and checks it against `quota`.
pub(crate) fn encode_collection(
    articles: &[ArticleRecord],
    quota: Option<usize>,
) -> Result<String, PersistenceError> {
    let encoded = serde_json::to_string(articles).map_err(PersistenceError::Serialize)?;
    if let Some(quota) = quota {
        if encoded.len() > quota {
            warn!(
                "event=articles_commit module=store status=error error_code=quota_exceeded bytes={} quota={}",
                encoded.len(),
                quota
            );
            return Err(PersistenceError::QuotaExceeded {
                required: encoded.len(),
                quota,
            });
        }
    }
    Ok(encoded)
}

/// Parses a stored blob. Corrupt input degrades to an empty collection.
pub(crate) fn decode_collection(raw: &str, slot_key: &str) -> Vec<ArticleRecord> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<ArticleRecord>>(raw) {
        Ok(articles) => articles,
        Err(err) => {
            warn!(
                "event=articles_load module=store status=degraded slot={} reason=corrupt_blob error={}",
                slot_key, err
            );
            Vec::new()
        }
    }
}

fn ensure_slot_table_ready(conn: &Connection) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'kv_slots'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(StoreError::MissingRequiredTable("kv_slots"))
    }
}

//! Process-local article store.
//!
//! Holds the collection in memory with the same ordering, encoding and
//! quota rules as the SQLite store. Used when no persistent slot is wanted
//! (previews, tests, `--memory` CLI sessions).

use crate::model::article::{ArticleId, ArticleRecord};
use crate::repo::article_repo::{
    encode_collection, prepare_replacement, upsert_into, ArticleStore, StoreResult,
};
use log::info;

/// In-memory `ArticleStore` implementation.
#[derive(Debug, Default)]
pub struct InMemoryArticleStore {
    articles: Vec<ArticleRecord>,
    quota_bytes: Option<usize>,
}

impl InMemoryArticleStore {
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the serialized collection size.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Swaps in `next` only when it encodes within quota.
    fn commit(&mut self, next: Vec<ArticleRecord>) -> StoreResult<()> {
        encode_collection(&next, self.quota_bytes)?;
        self.articles = next;
        Ok(())
    }
}

impl ArticleStore for InMemoryArticleStore {
    fn upsert(&mut self, record: &ArticleRecord) -> StoreResult<ArticleId> {
        let mut next = self.articles.clone();
        let (id, inserted) = upsert_into(&mut next, record);
        self.commit(next)?;
        info!(
            "event=article_upsert module=memory_store status=ok id={} inserted={} count={}",
            id,
            inserted,
            self.articles.len()
        );
        Ok(id)
    }

    fn get_all(&self) -> Vec<ArticleRecord> {
        self.articles.clone()
    }

    fn delete_by_id(&mut self, id: &str) -> StoreResult<bool> {
        let next: Vec<ArticleRecord> = self
            .articles
            .iter()
            .filter(|article| article.id.as_deref() != Some(id))
            .cloned()
            .collect();
        if next.len() != self.articles.len() {
            self.commit(next)?;
        }
        Ok(true)
    }

    fn replace_all(&mut self, articles: Vec<ArticleRecord>) -> StoreResult<()> {
        let articles = prepare_replacement(articles)?;
        self.commit(articles)
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.articles.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryArticleStore;
    use crate::model::article::ArticleRecord;
    use crate::repo::article_repo::{ArticleStore, PersistenceError, StoreError};

    #[test]
    fn failed_upsert_leaves_collection_untouched() {
        let mut store = InMemoryArticleStore::new().with_quota(400);
        let small = ArticleRecord::new("a", "b", "2024-01-01", "c", "d");
        store.upsert(&small).unwrap();

        let huge = ArticleRecord::new("big", "b", "2024-01-01", "c", "x".repeat(1024));
        let err = store.upsert(&huge).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Persistence(PersistenceError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get_all().len(), 1);
        assert_eq!(store.get_all()[0].title, "a");
    }
}

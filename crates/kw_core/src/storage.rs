use async_trait::async_trait;
use serde_json::Value;

use crate::types::{KeywordCollection, KeywordFilter, KeywordRecord, OptimizationLog};
use crate::Result;

#[async_trait]
pub trait KeywordStore: Send + Sync {
    /// Return every document of a collection, untyped.
    async fn list_documents(&self, collection: KeywordCollection) -> Result<Vec<Value>>;

    /// Highest search volume first, ties broken by lowest SEO difficulty.
    async fn top_keywords(
        &self,
        collection: KeywordCollection,
        filter: &KeywordFilter,
        limit: usize,
    ) -> Result<Vec<KeywordRecord>>;

    /// Append an entry to the optimisation log
    async fn log_optimization(&self, entry: &OptimizationLog) -> Result<()>;

    /// Whether the user has flagged this exact text as unwanted
    async fn has_feedback(&self, text: &str) -> Result<bool>;

    /// Store a raw keyword document
    async fn insert_document(&self, collection: KeywordCollection, document: Value) -> Result<()>;

    /// Cheap round trip to the backend
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Ordering shared by every backend that sorts in process.
pub fn rank_keywords(records: &mut [KeywordRecord]) {
    records.sort_by(|a, b| {
        b.search_volume
            .cmp(&a.search_volume)
            .then(a.seo_difficulty.total_cmp(&b.seo_difficulty))
    });
}

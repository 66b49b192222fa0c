use async_trait::async_trait;
use kw_core::storage::rank_keywords;
use kw_core::{
    KeywordCollection, KeywordFilter, KeywordRecord, KeywordStore, OptimizationLog, Result,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<KeywordCollection, Vec<Value>>,
    logs: Vec<OptimizationLog>,
}

impl MemoryStore {
    pub fn documents(&self, collection: KeywordCollection) -> Vec<Value> {
        self.collections.get(&collection).cloned().unwrap_or_default()
    }

    pub fn top_keywords(
        &self,
        collection: KeywordCollection,
        filter: &KeywordFilter,
        limit: usize,
    ) -> Vec<KeywordRecord> {
        let mut records: Vec<KeywordRecord> = self
            .collections
            .get(&collection)
            .into_iter()
            .flatten()
            .filter_map(KeywordRecord::from_document)
            .filter(|record: &KeywordRecord| filter.matches(&record.keyword))
            .collect();
        rank_keywords(&mut records);
        records.truncate(limit);
        records
    }

    pub fn insert(&mut self, collection: KeywordCollection, document: Value) {
        self.collections.entry(collection).or_default().push(document);
    }

    pub fn log(&mut self, entry: OptimizationLog) {
        self.logs.push(entry);
    }

    pub fn logs(&self) -> &[OptimizationLog] {
        &self.logs
    }

    pub fn has_feedback(&self, text: &str) -> bool {
        self.logs.iter().any(|log| log.feedback && log.text == text)
    }
}

/// Process-local store. Used by default and in tests; nothing survives a
/// restart.
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn empty() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
        }
    }

    pub async fn logs(&self) -> Vec<OptimizationLog> {
        self.store.read().await.logs().to_vec()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new(_url: Option<&str>) -> Result<Self> {
        Ok(Self::empty())
    }
}

#[async_trait]
impl KeywordStore for InMemoryStorage {
    async fn list_documents(&self, collection: KeywordCollection) -> Result<Vec<Value>> {
        Ok(self.store.read().await.documents(collection))
    }

    async fn top_keywords(
        &self,
        collection: KeywordCollection,
        filter: &KeywordFilter,
        limit: usize,
    ) -> Result<Vec<KeywordRecord>> {
        Ok(self.store.read().await.top_keywords(collection, filter, limit))
    }

    async fn log_optimization(&self, entry: &OptimizationLog) -> Result<()> {
        self.store.write().await.log(entry.clone());
        Ok(())
    }

    async fn has_feedback(&self, text: &str) -> Result<bool> {
        Ok(self.store.read().await.has_feedback(text))
    }

    async fn insert_document(&self, collection: KeywordCollection, document: Value) -> Result<()> {
        self.store.write().await.insert(collection, document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = InMemoryStorage::empty();
        assert!(storage.list_documents(KeywordCollection::Primary).await.unwrap().is_empty());

        storage
            .insert_document(
                KeywordCollection::Primary,
                json!({"keyword": "degree apprenticeships", "searchVolume": 900, "seoDifficulty": 30}),
            )
            .await
            .unwrap();
        storage
            .insert_document(
                KeywordCollection::Primary,
                json!({"keyword": "apprenticeships uk", "searchVolume": 900, "seoDifficulty": 12.5}),
            )
            .await
            .unwrap();
        storage
            .insert_document(
                KeywordCollection::Primary,
                json!({"keyword": "nursing", "searchVolume": 2000, "seoDifficulty": 70}),
            )
            .await
            .unwrap();
        storage
            .insert_document(
                KeywordCollection::Primary,
                json!({"keyword": "nursing degree", "searchVolume": 1500.0, "seoDifficulty": 35}),
            )
            .await
            .unwrap();
        storage
            .insert_document(KeywordCollection::Primary, json!({"note": "no keyword field"}))
            .await
            .unwrap();

        let docs = storage.list_documents(KeywordCollection::Primary).await.unwrap();
        assert_eq!(docs.len(), 5);

        let top = storage
            .top_keywords(KeywordCollection::Primary, &KeywordFilter::Any, 3)
            .await
            .unwrap();
        let names: Vec<_> = top.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(names, vec!["nursing", "nursing degree", "apprenticeships uk"]);

        let filtered = storage
            .top_keywords(
                KeywordCollection::Primary,
                &KeywordFilter::Containing("apprenticeships".into()),
                5,
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(storage
            .top_keywords(KeywordCollection::Secondary, &KeywordFilter::Any, 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_feedback_log() {
        let storage = InMemoryStorage::empty();
        storage
            .log_optimization(&OptimizationLog::new(vec![], "bad text", false, false))
            .await
            .unwrap();
        assert!(!storage.has_feedback("bad text").await.unwrap());

        storage
            .log_optimization(&OptimizationLog::new(vec![], "bad text", false, true))
            .await
            .unwrap();
        assert!(storage.has_feedback("bad text").await.unwrap());
        assert!(!storage.has_feedback("other text").await.unwrap());
        assert_eq!(storage.logs().await.len(), 2);
    }
}

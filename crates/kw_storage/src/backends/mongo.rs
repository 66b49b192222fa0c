use async_trait::async_trait;
use futures_util::TryStreamExt;
use kw_core::{
    KeywordCollection, KeywordFilter, KeywordRecord, KeywordStore, OptimizationLog, Result,
};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};
use serde_json::Value;
use std::env;

use crate::{BackendConfig, StorageBackend, DEFAULT_DATABASE, LOG_COLLECTION};

fn db_error(e: mongodb::error::Error) -> kw_core::Error {
    kw_core::Error::Database(e.to_string())
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

impl MongoConfig {
    pub fn new() -> Self {
        let host = env::var("MONGO_HOST").unwrap_or_else(|_| "localhost".to_string());
        Self {
            url: format!("mongodb://{}:27017", host),
            database: env::var("MONGO_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendConfig for MongoConfig {
    fn get_url(&self) -> String {
        self.url.clone()
    }

    fn get_database(&self) -> String {
        self.database.clone()
    }
}

/// MongoDB backend. One pooled client is shared by every request.
pub struct MongoStorage {
    client: Client,
    config: MongoConfig,
}

impl MongoStorage {
    pub async fn with_config(config: MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url).await.map_err(db_error)?;
        Ok(Self { client, config })
    }

    fn database(&self) -> Database {
        self.client.database(&self.config.database)
    }

    fn collection(&self, collection: KeywordCollection) -> Collection<Document> {
        self.database().collection(collection.as_str())
    }

    fn logs(&self) -> Collection<Document> {
        self.database().collection(LOG_COLLECTION)
    }
}

fn filter_document(filter: &KeywordFilter) -> Document {
    match filter {
        KeywordFilter::Any => doc! {},
        KeywordFilter::Containing(term) => doc! {
            "keyword": { "$regex": regex::escape(term) }
        },
        KeywordFilter::Excluding(term) => doc! {
            "$nor": [ { "keyword": { "$regex": regex::escape(term) } } ]
        },
    }
}

fn as_f64(value: Option<&Bson>) -> Option<f64> {
    match value? {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Numeric fields are stored as whatever type the importer produced.
fn record_from_document(document: &Document) -> Option<KeywordRecord> {
    let keyword = document.get_str("keyword").ok()?;
    Some(KeywordRecord::new(
        keyword,
        as_f64(document.get("searchVolume")).unwrap_or_default() as i64,
        as_f64(document.get("seoDifficulty")).unwrap_or_default(),
    ))
}

#[async_trait]
impl StorageBackend for MongoStorage {
    fn get_error_message() -> &'static str {
        "MongoDB should be reachable at mongodb://localhost:27017"
    }

    async fn new(url: Option<&str>) -> Result<Self> {
        let config = match url {
            Some(url) => MongoConfig::new().with_url(url),
            None => MongoConfig::new(),
        };
        Self::with_config(config).await
    }
}

#[async_trait]
impl KeywordStore for MongoStorage {
    async fn list_documents(&self, collection: KeywordCollection) -> Result<Vec<Value>> {
        let cursor = self
            .collection(collection)
            .find(None, None)
            .await
            .map_err(db_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(db_error)?;
        Ok(documents
            .into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect())
    }

    async fn top_keywords(
        &self,
        collection: KeywordCollection,
        filter: &KeywordFilter,
        limit: usize,
    ) -> Result<Vec<KeywordRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "searchVolume": -1, "seoDifficulty": 1 })
            .limit(limit as i64)
            .build();
        let cursor = self
            .collection(collection)
            .find(filter_document(filter), options)
            .await
            .map_err(db_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(db_error)?;
        Ok(documents.iter().filter_map(record_from_document).collect())
    }

    async fn log_optimization(&self, entry: &OptimizationLog) -> Result<()> {
        let document = doc! {
            "keywords": entry.keywords.clone(),
            "text": entry.text.clone(),
            "success": entry.success,
            "feedback": entry.feedback,
            "timestamp": bson::DateTime::from_millis(entry.timestamp.timestamp_millis()),
        };
        self.logs().insert_one(document, None).await.map_err(db_error)?;
        Ok(())
    }

    async fn has_feedback(&self, text: &str) -> Result<bool> {
        let found = self
            .logs()
            .find_one(doc! { "text": text, "feedback": true }, None)
            .await
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    async fn insert_document(&self, collection: KeywordCollection, document: Value) -> Result<()> {
        let document = bson::to_document(&document)
            .map_err(|e| kw_core::Error::Database(e.to_string()))?;
        self.collection(collection)
            .insert_one(document, None)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.database()
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

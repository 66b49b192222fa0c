//! Bulk import of keyword documents.
//!
//! Seed files are JSON objects keyed by collection name:
//! `{"Primary": [{"keyword": "...", "searchVolume": 10, "seoDifficulty": 2}], ...}`

use kw_core::{Error, KeywordCollection, KeywordStore, Result};
use serde_json::Value;
use std::path::Path;

pub async fn import_seed(store: &dyn KeywordStore, seed: &Value) -> Result<usize> {
    let object = seed
        .as_object()
        .ok_or_else(|| Error::Storage("Seed must be a JSON object keyed by collection".to_string()))?;

    let mut imported = 0;
    for (name, documents) in object {
        let collection: KeywordCollection = name.parse()?;
        let documents = documents.as_array().ok_or_else(|| {
            Error::Storage(format!("Seed entry for {} must be an array", collection))
        })?;
        for document in documents {
            store.insert_document(collection, document.clone()).await?;
            imported += 1;
        }
        tracing::debug!("Imported {} documents into {}", documents.len(), collection);
    }
    Ok(imported)
}

pub async fn import_seed_file(store: &dyn KeywordStore, path: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path).await?;
    let seed: Value = serde_json::from_str(&raw)?;
    import_seed(store, &seed).await
}

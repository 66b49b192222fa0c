use async_trait::async_trait;
use kw_core::{
    KeywordCollection, KeywordFilter, KeywordRecord, KeywordStore, OptimizationLog, Result,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS keywords (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        keyword TEXT,
        search_volume INTEGER NOT NULL DEFAULT 0,
        seo_difficulty REAL NOT NULL DEFAULT 0,
        doc TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS optimization_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        keywords TEXT NOT NULL,
        text TEXT NOT NULL,
        success INTEGER NOT NULL,
        feedback INTEGER NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_keywords_collection ON keywords (collection)",
];

fn db_error(context: &str, e: sqlx::Error) -> kw_core::Error {
    kw_core::Error::Database(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at ./keywords.db"
    }

    async fn new(url: Option<&str>) -> Result<Self> {
        let db_path = PathBuf::from(url.map(|u| u.trim_start_matches("sqlite:")).unwrap_or("keywords.db"));
        Self::new_with_path(&db_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl KeywordStore for SQLiteStorage {
    async fn list_documents(&self, collection: KeywordCollection) -> Result<Vec<Value>> {
        let rows = sqlx::query("SELECT doc FROM keywords WHERE collection = ? ORDER BY id")
            .bind(collection.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to list documents", e))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: String = row.get("doc");
            documents.push(serde_json::from_str(&doc)?);
        }
        Ok(documents)
    }

    async fn top_keywords(
        &self,
        collection: KeywordCollection,
        filter: &KeywordFilter,
        limit: usize,
    ) -> Result<Vec<KeywordRecord>> {
        let (condition, term) = match filter {
            KeywordFilter::Any => ("", None),
            KeywordFilter::Containing(term) => ("AND instr(keyword, ?) > 0", Some(term)),
            KeywordFilter::Excluding(term) => ("AND instr(keyword, ?) = 0", Some(term)),
        };
        let sql = format!(
            r#"
            SELECT keyword, search_volume, seo_difficulty FROM keywords
            WHERE collection = ? AND keyword IS NOT NULL {}
            ORDER BY search_volume DESC, seo_difficulty ASC
            LIMIT ?
            "#,
            condition
        );

        let mut query = sqlx::query(&sql).bind(collection.as_str());
        if let Some(term) = term {
            query = query.bind(term.as_str());
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to select top keywords", e))?;

        Ok(rows
            .into_iter()
            .map(|row| KeywordRecord {
                keyword: row.get("keyword"),
                search_volume: row.get("search_volume"),
                seo_difficulty: row.get("seo_difficulty"),
            })
            .collect())
    }

    async fn log_optimization(&self, entry: &OptimizationLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO optimization_logs (keywords, text, success, feedback, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(serde_json::to_string(&entry.keywords)?)
        .bind(&entry.text)
        .bind(entry.success)
        .bind(entry.feedback)
        .bind(entry.timestamp.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to log optimization", e))?;
        Ok(())
    }

    async fn has_feedback(&self, text: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM optimization_logs WHERE text = ? AND feedback = 1",
        )
        .bind(text)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to check feedback", e))?;
        Ok(row.get::<i64, _>("n") > 0)
    }

    async fn insert_document(&self, collection: KeywordCollection, document: Value) -> Result<()> {
        let record = KeywordRecord::from_document(&document);
        sqlx::query(
            r#"
            INSERT INTO keywords (collection, keyword, search_volume, seo_difficulty, doc)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection.as_str())
        .bind(record.as_ref().map(|r| r.keyword.clone()))
        .bind(record.as_ref().map(|r| r.search_volume).unwrap_or_default())
        .bind(record.as_ref().map(|r| r.seo_difficulty).unwrap_or_default())
        .bind(serde_json::to_string(&document)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to insert document", e))?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Health check failed", e))?;
        Ok(())
    }
}

use async_trait::async_trait;
use kw_core::{KeywordStore, Result};
use std::fmt;
use std::sync::Arc;

pub mod backends;
pub mod seed;

pub use backends::*;

pub const DEFAULT_DATABASE: &str = "KeywordDB";
pub const LOG_COLLECTION: &str = "OptimizationLogs";

#[async_trait]
pub trait StorageBackend: KeywordStore {
    fn get_error_message() -> &'static str
    where
        Self: Sized;

    async fn new(url: Option<&str>) -> Result<Self>
    where
        Self: Sized;
}

pub trait BackendConfig: fmt::Debug {
    fn get_url(&self) -> String;
    fn get_database(&self) -> String;
}

async fn connect<T: StorageBackend + 'static>(url: Option<&str>) -> Result<Arc<dyn KeywordStore>> {
    match T::new(url).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => Err(kw_core::Error::Storage(format!(
            "{} ({})",
            T::get_error_message(),
            e
        ))),
    }
}

/// Build the backend named on the command line.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn KeywordStore>> {
    match kind {
        "memory" => connect::<InMemoryStorage>(url).await,
        #[cfg(feature = "mongodb")]
        "mongodb" | "mongo" => connect::<MongoStorage>(url).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => connect::<SQLiteStorage>(url).await,
        other => Err(kw_core::Error::Storage(format!(
            "Unknown or disabled storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig, StorageBackend};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_storage() {
        assert!(create_storage("memory", None).await.is_ok());
        assert!(create_storage("cassandra", None).await.is_err());
    }
}

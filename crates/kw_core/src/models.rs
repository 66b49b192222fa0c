use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait RewriteModel: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite `text` so that it naturally contains `keywords`
    async fn rewrite(&self, text: &str, keywords: &[String]) -> Result<String>;
}

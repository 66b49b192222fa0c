use async_trait::async_trait;
use kw_core::seo::insert_keyword;
use kw_core::{Result, RewriteModel};
use std::fmt;

/// Offline model: inserts each missing keyword after the first sentence.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RewriteModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn rewrite(&self, text: &str, keywords: &[String]) -> Result<String> {
        Ok(keywords
            .iter()
            .fold(text.to_string(), |acc, keyword| insert_keyword(&acc, keyword)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();
        let text = model
            .rewrite(
                "Study with us. Apply today.",
                &["nursing".to_string(), "**apply**".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(text, "Study with us. nursing Apply today.");
        assert_eq!(model.name(), "Dummy");
    }
}

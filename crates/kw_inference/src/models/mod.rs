use kw_core::{Result, RewriteModel};
use std::sync::Arc;

use crate::Config;

pub mod chat;
pub mod dummy;

pub use chat::ChatCompletionModel;
pub use dummy::DummyModel;

pub const AVAILABLE_MODELS: &[&str] = &["openai", "deepseek", "dummy"];

/// Build the rewrite model named in `config`, defaulting to OpenAI.
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn RewriteModel>> {
    let config = config.unwrap_or_default();
    let name = config
        .model_name
        .clone()
        .unwrap_or_else(|| "openai".to_string())
        .to_lowercase();

    let chat = |model: ChatCompletionModel| match &config.chat_model {
        Some(id) => model.with_model(id.clone()),
        None => model,
    };
    let model: Arc<dyn RewriteModel> = match name.as_str() {
        "openai" => Arc::new(chat(ChatCompletionModel::openai(&config)?)),
        "deepseek" => Arc::new(chat(ChatCompletionModel::deepseek(&config)?)),
        "dummy" => Arc::new(DummyModel::new()),
        other => {
            return Err(kw_core::Error::Inference(format!(
                "Unknown model: {}. Available models: {}",
                other,
                AVAILABLE_MODELS.join(", ")
            )))
        }
    };
    tracing::debug!("Created rewrite model {}", model.name());
    Ok(model)
}

use async_trait::async_trait;
use kw_core::{Result, RewriteModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::prompt::{rewrite_prompt, SYSTEM_PROMPT};
use crate::Config;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.4;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
    name: String,
}

impl ChatCompletionModel {
    pub fn new(name: &str, config: &Config, default_url: &str, default_model: &str) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            kw_core::Error::Inference(format!("{} API key is required", name))
        })?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: config
                .model_url
                .clone()
                .unwrap_or_else(|| default_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: default_model.to_string(),
            name: name.to_string(),
        })
    }

    pub fn openai(config: &Config) -> Result<Self> {
        Self::new("OpenAI", config, OPENAI_BASE_URL, OPENAI_MODEL)
    }

    pub fn deepseek(config: &Config) -> Result<Self> {
        Self::new("DeepSeek", config, DEEPSEEK_BASE_URL, DEEPSEEK_MODEL)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for ChatCompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl RewriteModel for ChatCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rewrite(&self, text: &str, keywords: &[String]) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: rewrite_prompt(text, keywords),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| kw_core::Error::Inference("Model returned no choices".to_string()))?;
        tracing::debug!("{} rewrite returned {} bytes", self.name, content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(url: Option<String>) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            model_url: url,
            ..Default::default()
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = ChatCompletionModel::openai(&Config::default());
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Inference error: OpenAI API key is required"
        );
        assert!(ChatCompletionModel::deepseek(&config(None)).is_ok());
    }

    #[tokio::test]
    async fn test_rewrite_calls_chat_endpoint() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
                assert!(user.contains("Keywords to Integrate: nursing"));
                assert_eq!(body["model"], "gpt-3.5-turbo");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "We offer a nursing degree."}}]
                }))
            }),
        );
        let url = serve(router).await;

        let model = ChatCompletionModel::openai(&config(Some(format!("{}/", url)))).unwrap();
        let text = model
            .rewrite("We offer a degree.", &["nursing".to_string()])
            .await
            .unwrap();
        assert_eq!(text, "We offer a nursing degree.");
    }

    #[tokio::test]
    async fn test_with_model_overrides_default_model() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "choices": [{"message": {"content": body["model"].as_str().unwrap_or_default()}}]
                }))
            }),
        );
        let url = serve(router).await;

        let model = ChatCompletionModel::deepseek(&config(Some(url)))
            .unwrap()
            .with_model("deepseek-reasoner");
        assert_eq!(model.rewrite("text", &[]).await.unwrap(), "deepseek-reasoner");
    }

    #[tokio::test]
    async fn test_rewrite_without_choices_is_an_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let url = serve(router).await;

        let model = ChatCompletionModel::openai(&config(Some(url))).unwrap();
        assert!(model.rewrite("text", &[]).await.is_err());
    }
}

//! HTTP client for a running optimisation service.

use kw_core::{CmsSubmitRequest, FeedbackRequest, OptimizeRequest, OptimizeResponse, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OptimizeClient {
    client: Client,
    base_url: String,
}

impl OptimizeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| kw_core::Error::External(anyhow::anyhow!("Invalid API URL {}: {}", base_url, e)))?;
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /optimize`. Fields missing from the response come back as
    /// empty strings, empty lists and zero scores.
    pub async fn optimize(&self, text: &str) -> Result<OptimizeResponse> {
        let response = self
            .client
            .post(format!("{}/optimize", self.base_url))
            .json(&OptimizeRequest {
                text: text.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<OptimizeResponse>()
            .await?;
        Ok(response)
    }

    /// `POST /feedback`: ask the service never to optimise `text` again.
    pub async fn feedback(&self, text: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/feedback", self.base_url))
            .json(&FeedbackRequest {
                text: text.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }

    /// `POST /contensis/submit`, relaying whatever the CMS answered.
    pub async fn submit(&self, optimized_content: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/contensis/submit", self.base_url))
            .json(&CmsSubmitRequest {
                optimized_content: optimized_content.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_optimize_defaults_missing_fields() {
        let router = Router::new().route(
            "/optimize",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "optimizedText": format!("{} nursing", body["text"].as_str().unwrap_or_default()),
                    "highlightedKeywords": ["nursing"]
                }))
            }),
        );
        let url = serve(router).await;

        let client = OptimizeClient::new(&url, Duration::from_secs(5)).unwrap();
        let response = client.optimize("Study").await.unwrap();
        assert_eq!(response.optimized_text, "Study nursing");
        assert_eq!(response.highlighted_keywords, vec!["nursing".to_string()]);
        assert_eq!(response.current_seo_score, 0.0);
        assert_eq!(response.target_seo_score, 0.0);
    }

    #[tokio::test]
    async fn test_optimize_error_status() {
        let router = Router::new().route(
            "/optimize",
            post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"error": "No content provided"}))) }),
        );
        let url = serve(router).await;

        let client = OptimizeClient::new(&url, Duration::from_secs(5)).unwrap();
        assert!(client.optimize("").await.is_err());
    }

    #[tokio::test]
    async fn test_submit_relays_cms_response() {
        let router = Router::new().route(
            "/contensis/submit",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"published": body["optimizedContent"]}))
            }),
        );
        let url = serve(router).await;

        let client = OptimizeClient::new(&url, Duration::from_secs(5)).unwrap();
        let response = client.submit("<p>Study nursing</p>").await.unwrap();
        assert_eq!(response, json!({"published": "<p>Study nursing</p>"}));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(OptimizeClient::new("not a url", Duration::from_secs(1)).is_err());
        let client = OptimizeClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}

use kw_core::Result;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct CmsConfig {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct CmsPayload<'a> {
    content: &'a str,
}

/// Forwards optimised content to the Contensis CMS.
#[derive(Clone)]
pub struct CmsClient {
    client: Client,
    config: CmsConfig,
}

impl CmsClient {
    pub fn new(config: CmsConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Post `{ content }` and hand back the CMS status and JSON body.
    pub async fn submit(&self, content: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(&CmsPayload { content })
            .send()
            .await?;
        let status = response.status();
        let body = response.json::<Value>().await?;
        Ok((status, body))
    }
}

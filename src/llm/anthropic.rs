//! Anthropic messages-API generator.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm::{GeneratorConfig, TextGenerator};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text generator backed by the Anthropic messages API.
pub struct AnthropicGenerator {
    config: GeneratorConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, system: &str, user_text: &str) -> Result<String, LlmError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": system,
            "messages": [
                {"role": "user", "content": user_text},
            ],
        });

        let resp = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited {
                provider: "anthropic".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: "anthropic".into(),
                reason: format!("status {status}: {body}"),
            });
        }

        let parsed: MessagesResponse = resp.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "anthropic".into(),
                reason: "response missing text content".into(),
            })
    }
}

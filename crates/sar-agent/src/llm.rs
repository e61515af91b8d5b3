//! OpenAI-compatible chat-completion client.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use sar_contracts::error::{HealthError, HealthResult};
use sar_core::traits::LlmClient;

use crate::config::LlmConfig;

pub struct OpenAiChatClient {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(api_key: &str, config: &LlmConfig) -> HealthResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| HealthError::ConfigError {
                reason: format!("failed to build LLM HTTP client: {e}"),
            })?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Build a client when the configured key variable is set, else `None`.
    pub fn from_env(config: &LlmConfig) -> HealthResult<Option<Self>> {
        config
            .api_key()
            .map(|key| Self::new(&key, config))
            .transpose()
    }

    pub fn request_body(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_tokens": self.max_tokens
        })
    }

    /// Pull the trimmed reply text out of a chat-completion response.
    pub fn parse_response(json: &Value) -> HealthResult<String> {
        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| HealthError::Upstream {
                reason: "missing choices[0].message.content".to_string(),
            })
    }
}

impl LlmClient for OpenAiChatClient {
    fn complete(&self, system: &str, user: &str) -> HealthResult<String> {
        let upstream = |e: reqwest::Error| HealthError::Upstream {
            reason: e.to_string(),
        };

        debug!(model = %self.model, prompt_chars = user.len(), "sending chat completion");
        let json: Value = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, user))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())
            .map_err(upstream)?;

        Self::parse_response(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

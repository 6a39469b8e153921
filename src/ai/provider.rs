//! Chat-completions provider seam.
//!
//! Handlers and the gateway only see [`ChatProvider`]; the production
//! implementation talks to an OpenAI-compatible endpoint over reqwest.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::OpenAiConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends OpenAI-style chat messages with a JSON-object response
    /// format and returns the raw content of the first choice.
    async fn complete_json(
        &self,
        messages: Vec<Value>,
        temperature: Option<f32>,
    ) -> Result<String, ProviderError>;
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete_json(
        &self,
        messages: Vec<Value>,
        temperature: Option<f32>,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("OPENAI_API_KEY"));
        }

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
        });
        if let Some(t) = temperature {
            body["temperature"] = json!(t);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }
}

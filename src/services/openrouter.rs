//! Hosted LLM chat-completion client used for every narrative report.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::OpenRouterConfig;

use super::upstream_error_message;

#[derive(Debug, Error)]
pub enum OpenRouterError {
    #[error("OpenRouter misconfigured: {0}")]
    Misconfigured(String),
    #[error("OpenRouter API request failed: {0}")]
    Network(String),
    #[error("OpenRouter returned invalid JSON: {0}")]
    Parse(String),
    #[error("{0}")]
    Upstream(String),
    #[error("OpenRouter returned no choices")]
    NoChoices,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

pub struct OpenRouterClient {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// One-shot chat completion; returns the trimmed assistant message.
    /// Callers substitute their own fallback when the content is empty.
    pub async fn chat(&self, prompt: &str, max_tokens: u32) -> Result<String, OpenRouterError> {
        if self.config.api_key.is_empty() {
            return Err(OpenRouterError::Misconfigured(
                "OPENROUTER_API_KEY is not set".to_string(),
            ));
        }

        let payload = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_tokens,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OpenRouterError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OpenRouterError::Upstream(
                upstream_error_message(response).await,
            ));
        }

        let body: CompletionBody = response
            .json()
            .await
            .map_err(|e| OpenRouterError::Parse(e.to_string()))?;

        let choice = body.choices.into_iter().next().ok_or(OpenRouterError::NoChoices)?;
        Ok(choice.message.content.trim().to_string())
    }
}

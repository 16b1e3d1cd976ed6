use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::corpus::COMPLETION_END_TOKEN;

/// The completion collaborator: hands back raw generated text for a
/// prompt within a token budget. The core only consumes the returned
/// text; transport, auth, and retries are the implementation's business.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Configuration for the OpenAI completions client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key (from OPENAI_API_KEY env var)
    pub api_key: String,
    /// Fine-tuned model to query
    pub model: String,
    /// API base URL
    pub base_url: String,
}

impl OpenAiConfig {
    /// Create config from environment variables
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Client for the legacy completions endpoint fine-tuned models answer on
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            max_tokens,
            stop: COMPLETION_END_TOKEN.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to completions API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completions API error: {} - {}", status, body);
        }

        let response: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse completions API response")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .context("No choices in completions response")
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    stop: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_response_parsing() {
        let json = r#"{
            "id": "cmpl-123",
            "object": "text_completion",
            "created": 1677652288,
            "model": "davinci:ft-personal-2023",
            "choices": [{
                "text": "Ira Glass : Welcome back to the show.\n",
                "index": 0,
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52}
        }"#;

        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].text,
            "Ira Glass : Welcome back to the show.\n"
        );
    }

    #[test]
    fn test_empty_choices_rejected() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.choices.is_empty());
    }

    #[test]
    fn test_request_carries_stop_sequence() {
        let request = CompletionRequest {
            model: "davinci:ft".to_string(),
            prompt: "Write a prologue".to_string(),
            max_tokens: 100,
            stop: COMPLETION_END_TOKEN.to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"stop\":\"###\""));
        assert!(json.contains(r#""max_tokens":100"#));
    }
}

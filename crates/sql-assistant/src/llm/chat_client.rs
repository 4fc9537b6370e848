//! OpenAI-compatible chat-completions client.
//!
//! Each rendered instruction goes out as a single user message. Timeouts come
//! from the HTTP client; there is no retry.
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::LanguageModel;
use crate::config::Config;
use crate::error::{AssistantError, Result};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct ChatCompletionClient {
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
    http_client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(base_url: &str, api_key: Option<String>, temperature: f32, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::model_unavailable(format!("Failed to build HTTP client: {}", e)))?;
        debug!("Chat completion client initialized with backend: {}", base_url);
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature,
            http_client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.model_base_url,
            config.api_key.clone(),
            config.temperature,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        debug!("Requesting completion from {} ({} chars)", model, prompt.len());
        let request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let mut builder = self.http_client.post(self.completions_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AssistantError::model_unavailable(format!("LLM backend request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("LLM backend returned {}", status);
            return Err(AssistantError::model_unavailable(format!(
                "LLM backend returned {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::model_unavailable(format!("Failed to parse LLM response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| AssistantError::model_unavailable("LLM response contained no message content"))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

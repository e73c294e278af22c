//! OpenAI-compatible API client for embeddings and chat completions
//!
//! Requests are sent once; failures are surfaced to the caller without retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::LlmProvider;

/// OpenAI API client
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API base URL without trailing slash
    base_url: String,
    /// Bearer credential
    api_key: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Create a client; fails with `MissingCapability` when no API key is configured
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::missing_capability(
                    "OpenAI API key is not configured. Set OPENAI_API_KEY to enable embeddings and chat.",
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-success response into the API's error message
    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        format!("HTTP {} - {}", status, detail)
    }

    /// Embed `texts` with `model`, returning vectors in input order
    pub async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        tracing::debug!(model, batch_size = texts.len(), "embedding batch");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model, input: texts })
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(Self::error_detail(response).await));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, API returned {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Send `prompt` as a single user message and return the reply text
    pub async fn chat(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model, prompt_len = prompt.len(), "chat completion");

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::llm(format!(
                "Generation failed: {}",
                Self::error_detail(response).await
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse generation response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::llm("Generation returned no choices"))
    }
}

/// Chat model provider backed by [`OpenAiClient`]
pub struct OpenAiLlm {
    client: Arc<OpenAiClient>,
    model: String,
    temperature: f32,
}

impl OpenAiLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.chat_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.chat(&self.model, prompt, self.temperature).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

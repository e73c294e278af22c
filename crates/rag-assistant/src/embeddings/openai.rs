//! OpenAI embedding provider

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::OpenAiClient;

use super::EmbeddingProvider;

/// Embeddings from the `/embeddings` endpoint of an OpenAI-compatible API
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.client.embed(&self.model, &[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("API returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.client.embed(&self.model, texts).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "openai"
    }
}

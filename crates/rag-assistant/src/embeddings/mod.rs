//! Embedding providers

pub mod openai;

use async_trait::async_trait;

use crate::error::Result;

pub use openai::OpenAiEmbedder;

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in order
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding model name, recorded in the index
    fn model(&self) -> &str;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

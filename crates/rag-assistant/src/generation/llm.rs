//! LLM provider trait for generating answers

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt-in, text-out generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

//! Answer generation with a chat model

pub mod llm;
pub mod openai;
pub mod prompt;

pub use llm::LlmProvider;
pub use openai::{OpenAiClient, OpenAiLlm};
pub use prompt::PromptBuilder;

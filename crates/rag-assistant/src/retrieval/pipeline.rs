//! Condense → retrieve → generate

use std::sync::Arc;
use std::time::Instant;

use crate::config::RetrievalConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::generation::{LlmProvider, PromptBuilder};
use crate::index::IndexRepository;
use crate::types::{Chunk, ConversationTurn, QueryResult};

/// Answers questions from the current index
pub struct QueryPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    repository: Arc<dyn IndexRepository>,
    config: RetrievalConfig,
}

impl QueryPipeline {
    /// Create a new query pipeline
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        repository: Arc<dyn IndexRepository>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            llm,
            repository,
            config,
        }
    }

    /// Answer `question`, using `history` to resolve follow-ups
    pub async fn query(&self, question: &str, history: &[ConversationTurn]) -> Result<QueryResult> {
        let start = Instant::now();

        let index = self.repository.load().await?.ok_or(Error::NoIndex)?;

        let standalone = self.condense(question, history).await?;

        if index.model != self.embedder.model() {
            tracing::warn!(
                "Index was built with '{}' but queries are embedded with '{}'",
                index.model,
                self.embedder.model()
            );
        }

        let query_embedding = self.embedder.embed(&standalone).await?;
        let hits = index.search(&query_embedding, self.config.top_k)?;
        tracing::debug!(
            "Retrieved {} of {} chunks (best similarity {:.3})",
            hits.len(),
            index.len(),
            hits.first().map(|h| h.similarity).unwrap_or(0.0)
        );

        let chunks: Vec<Chunk> = hits.into_iter().map(|h| h.chunk).collect();
        let context = PromptBuilder::build_context(&chunks);
        let prompt = PromptBuilder::build_qa_prompt(&standalone, &context);
        let answer = self.llm.generate(&prompt).await?;

        let sources = chunks
            .into_iter()
            .map(|chunk| Chunk {
                content: truncate_chars(&chunk.content, self.config.preview_chars),
                source: chunk.source,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Answered with {} sources via {} ({}) in {:?}",
            sources.len(),
            self.llm.name(),
            self.llm.model(),
            start.elapsed()
        );

        Ok(QueryResult { answer, sources })
    }

    /// Rewrite a follow-up into a standalone question; unchanged without history
    async fn condense(&self, question: &str, history: &[ConversationTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = PromptBuilder::build_condense_prompt(question, history);
        let standalone = self.llm.generate(&prompt).await?;
        let standalone = standalone.trim();

        if standalone.is_empty() {
            return Ok(question.to_string());
        }
        tracing::debug!("Condensed '{}' into '{}'", question, standalone);
        Ok(standalone.to_string())
    }
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

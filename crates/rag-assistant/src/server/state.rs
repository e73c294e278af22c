//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::{EmbeddingProvider, OpenAiEmbedder};
use crate::error::{Error, Result};
use crate::generation::{LlmProvider, OpenAiClient, OpenAiLlm};
use crate::index::{FsIndexRepository, IndexRepository, Indexer};
use crate::ingestion::IngestPipeline;
use crate::retrieval::QueryPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider, absent without credentials
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    /// Chat model, absent without credentials
    llm: Option<Arc<dyn LlmProvider>>,
    /// Where the index lives
    repository: Arc<dyn IndexRepository>,
}

impl AppState {
    /// Create state backed by the OpenAI-compatible API and the on-disk index
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");

        let (embedder, llm) = match OpenAiClient::new(&config.llm) {
            Ok(client) => {
                let client = Arc::new(client);
                tracing::info!(
                    "OpenAI client initialized ({}, embeddings: {}, chat: {})",
                    client.base_url(),
                    config.embeddings.model,
                    config.llm.chat_model
                );
                let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::from_client(
                    client.clone(),
                    config.embeddings.model.clone(),
                ));
                let llm: Arc<dyn LlmProvider> =
                    Arc::new(OpenAiLlm::from_client(client, &config.llm));
                (Some(embedder), Some(llm))
            }
            Err(Error::MissingCapability(reason)) => {
                tracing::warn!("{} Uploads and chat will fail until it is set.", reason);
                (None, None)
            }
            Err(e) => return Err(e),
        };

        let repository: Arc<dyn IndexRepository> =
            Arc::new(FsIndexRepository::new(config.storage.index_dir.clone()));
        tracing::info!(
            "Index repository initialized at {}",
            config.storage.index_dir.display()
        );

        Ok(Self::with_providers(config, embedder, llm, repository))
    }

    /// Create state from explicit providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        llm: Option<Arc<dyn LlmProvider>>,
        repository: Arc<dyn IndexRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                repository,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the index repository
    pub fn repository(&self) -> Arc<dyn IndexRepository> {
        self.inner.repository.clone()
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.inner.embedder.clone().ok_or_else(|| {
            Error::missing_capability("Embedding provider is not configured (set OPENAI_API_KEY)")
        })
    }

    /// Get the chat model
    pub fn llm(&self) -> Result<Arc<dyn LlmProvider>> {
        self.inner.llm.clone().ok_or_else(|| {
            Error::missing_capability("Chat model is not configured (set OPENAI_API_KEY)")
        })
    }

    /// Loader and splitter for uploads
    pub fn ingest_pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(&self.inner.config.chunking)
    }

    /// Indexer writing to the shared repository
    pub fn indexer(&self) -> Result<Indexer> {
        Ok(Indexer::new(
            self.embedder()?,
            self.repository(),
            self.inner.config.embeddings.batch_size,
        ))
    }

    /// Query pipeline over the shared repository
    pub fn query_pipeline(&self) -> Result<QueryPipeline> {
        Ok(QueryPipeline::new(
            self.embedder()?,
            self.llm()?,
            self.repository(),
            self.inner.config.retrieval.clone(),
        ))
    }
}

//! Embed chunks and persist them as the new index

use std::sync::Arc;
use std::time::Instant;

use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::types::Chunk;

use super::repository::IndexRepository;
use super::store::VectorIndex;

/// Builds a fresh index from chunks and replaces the stored one
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    repository: Arc<dyn IndexRepository>,
    batch_size: usize,
}

impl Indexer {
    /// Create an indexer; `batch_size` is clamped to at least 1
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn IndexRepository>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            repository,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed every chunk, persist the resulting index and return the chunk count
    ///
    /// An empty chunk list is rejected and leaves the stored index untouched.
    pub async fn index(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Err(Error::index("document produced no chunks"));
        }
        let start = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embedder.embed_batch(batch).await?;
            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "{} returned {} embeddings for {} texts",
                    self.embedder.name(),
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let index = VectorIndex::build(self.embedder.model(), chunks, embeddings)?;
        let count = index.len();
        self.repository.replace(&index).await?;

        tracing::info!(
            "Indexed {} chunks with {} ({} dims) into {} repository in {:?}",
            count,
            self.embedder.model(),
            index.dimensions,
            self.repository.name(),
            start.elapsed()
        );
        Ok(count)
    }
}

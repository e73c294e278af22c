//! Flat vector index with exact cosine search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// One embedded chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Chunk the vector was computed from
    pub chunk: Chunk,
}

/// Search hit
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query
    pub similarity: f32,
}

/// All embedded chunks of the most recent ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Index ID, new for every ingestion
    pub id: Uuid,
    /// Build timestamp
    pub created_at: DateTime<Utc>,
    /// Embedding model that produced the vectors
    pub model: String,
    /// Vector dimensions (0 for an empty index)
    pub dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Pair chunks with their embeddings; every vector must have the same length
    pub fn build(
        model: impl Into<String>,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(Error::index(format!(
                "embedding {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimensions
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { embedding, chunk })
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            model: model.into(),
            dimensions,
            entries,
        })
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed entries in insertion order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Return the `top_k` most similar chunks, best first; ties keep insertion order
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(Error::index(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Cosine similarity; 0.0 if either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk::new(text, "test.txt")
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = VectorIndex::build(
            "test-model",
            vec![chunk("east"), chunk("north"), chunk("north-east")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        )
        .unwrap();

        let hits = index.search(&[0.0, 2.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.content, "north");
        assert_eq!(hits[1].chunk.content, "north-east");
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_larger_than_index() {
        let index =
            VectorIndex::build("m", vec![chunk("only")], vec![vec![0.5, 0.5, 0.0]]).unwrap();
        assert_eq!(index.search(&[1.0, 0.0, 0.0], 10).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = VectorIndex::build("m", Vec::new(), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimensions, 0);
        assert!(index.search(&[1.0, 2.0], 4).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        assert!(VectorIndex::build("m", vec![chunk("a")], Vec::new()).is_err());
        assert!(VectorIndex::build(
            "m",
            vec![chunk("a"), chunk("b")],
            vec![vec![1.0, 0.0], vec![1.0]]
        )
        .is_err());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = VectorIndex::build("m", vec![chunk("a")], vec![vec![1.0, 0.0]]).unwrap();
        assert!(matches!(index.search(&[1.0], 1), Err(Error::Index(_))));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}

//! Response types for uploads and chat

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Answer plus the chunks it was generated from
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Generated answer
    pub answer: String,
    /// Retrieved chunks in retrieval order, text already truncated
    pub sources: Vec<Chunk>,
}

/// A source snippet returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Snippet text
    pub page_content: String,
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer
    pub answer: String,
    /// Supporting snippets
    pub source_documents: Vec<SourceDocument>,
}

impl From<QueryResult> for ChatResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            answer: result.answer,
            source_documents: result
                .sources
                .into_iter()
                .map(|chunk| SourceDocument {
                    page_content: chunk.content,
                })
                .collect(),
        }
    }
}

/// Body returned by `POST /upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always `"ingested"` on success
    pub status: String,
    /// Number of chunks in the new index
    pub chunks: usize,
    /// Stored filename
    pub filename: String,
}

impl UploadResponse {
    /// Create a successful upload response
    pub fn ingested(chunks: usize, filename: impl Into<String>) -> Self {
        Self {
            status: "ingested".to_string(),
            chunks,
            filename: filename.into(),
        }
    }
}

//! rag-assistant: a personal RAG assistant over uploaded documents
//!
//! Uploaded files are loaded, split into overlapping chunks, embedded and persisted
//! as a single on-disk vector index. Chat requests retrieve the nearest chunks and
//! hand them, together with the conversation so far, to a chat model.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document},
    query::{ChatRequest, ConversationTurn},
    response::{ChatResponse, QueryResult, SourceDocument, UploadResponse},
};

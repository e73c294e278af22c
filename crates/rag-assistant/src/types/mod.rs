//! Core types for the RAG assistant

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document};
pub use query::{ChatRequest, ConversationTurn};
pub use response::{ChatResponse, QueryResult, SourceDocument, UploadResponse};

//! Error types for the RAG assistant

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required provider (embeddings, chat model, parser) is not available
    #[error("{0}")]
    MissingCapability(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Saving an uploaded file failed
    #[error("Failed to save file: {0}")]
    Upload(String),

    /// Client sent an unusable request
    #[error("{0}")]
    BadRequest(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Chat model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// No vector index has been persisted yet
    #[error("No index found. Upload documents first.")]
    NoIndex,

    /// Vector index could not be built, read or written
    #[error("Vector index error: {0}")]
    Index(String),

    /// Ingestion of an uploaded file failed
    #[error("Ingest failed: {0}")]
    Ingest(Box<Error>),

    /// Retrieval or generation failed while answering
    #[error("LLM chain error: {0}")]
    Chain(Box<Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a missing capability error
    pub fn missing_capability(message: impl Into<String>) -> Self {
        Self::MissingCapability(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a vector index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Wrap an error raised while ingesting an upload
    pub fn ingest(inner: Error) -> Self {
        Self::Ingest(Box::new(inner))
    }

    /// Wrap an error raised by the query pipeline
    pub fn chain(inner: Error) -> Self {
        Self::Chain(Box::new(inner))
    }

    /// HTTP status and machine-readable type for this error
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::MissingCapability(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_capability")
            }
            Error::FileParse { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "parse_error"),
            Error::Upload(_) => (StatusCode::INTERNAL_SERVER_ERROR, "upload_error"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::Llm(_) => (StatusCode::INTERNAL_SERVER_ERROR, "llm_error"),
            Error::NoIndex => (StatusCode::BAD_REQUEST, "no_index"),
            Error::Index(_) => (StatusCode::INTERNAL_SERVER_ERROR, "index_error"),
            Error::Ingest(inner) => (inner.status().0, "ingest_error"),
            Error::Chain(inner) => (inner.status().0, "chain_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::INTERNAL_SERVER_ERROR, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        if status.is_server_error() {
            tracing::error!("{} ({})", self, error_type);
        } else {
            tracing::warn!("{} ({})", self, error_type);
        }

        let body = Json(json!({
            "detail": self.to_string(),
            "type": error_type,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_index_is_client_error() {
        let (status, kind) = Error::NoIndex.status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(kind, "no_index");
        assert_eq!(
            Error::NoIndex.to_string(),
            "No index found. Upload documents first."
        );
    }

    #[test]
    fn test_wrapped_errors_keep_inner_message() {
        let err = Error::ingest(Error::missing_capability("embedding provider is not configured"));
        assert_eq!(
            err.to_string(),
            "Ingest failed: embedding provider is not configured"
        );
        assert_eq!(err.status().0, StatusCode::INTERNAL_SERVER_ERROR);

        let err = Error::chain(Error::llm("HTTP 429"));
        assert_eq!(err.to_string(), "LLM chain error: LLM error: HTTP 429");

        let err = Error::chain(Error::BadRequest("empty".into()));
        assert_eq!(err.status(), (StatusCode::BAD_REQUEST, "chain_error"));
    }
}

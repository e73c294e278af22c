//! Document and chunk types

use serde::{Deserialize, Serialize};

/// A loaded document, alive only between loading and splitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path the document was loaded from
    pub source: String,
    /// Full text content
    pub content: String,
}

impl Document {
    /// Create a new document
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A bounded slice of a document's text; the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub content: String,
    /// Source path of the originating document
    pub source: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

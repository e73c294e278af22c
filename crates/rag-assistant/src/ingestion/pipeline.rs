//! Load → split sequencing for a single uploaded file

use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

use super::loader::loader_for_path;
use super::splitter::{splitter_for, TextSplitter};

/// Turns a file on disk into chunks ready for indexing
pub struct IngestPipeline {
    splitter: Box<dyn TextSplitter>,
}

impl IngestPipeline {
    /// Create a pipeline using the splitter selected in `config`
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            splitter: splitter_for(config),
        }
    }

    /// Create a pipeline with an explicit splitter
    pub fn with_splitter(splitter: Box<dyn TextSplitter>) -> Self {
        Self { splitter }
    }

    /// Load the documents contained in `path`
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let loader = loader_for_path(path);
        tracing::debug!("Loading '{}' with {} loader", path.display(), loader.name());
        loader.load(path)
    }

    /// Split documents into chunks
    pub fn split(&self, docs: &[Document]) -> Vec<Chunk> {
        self.splitter.split_documents(docs)
    }

    /// Load and split `path`
    pub fn run(&self, path: &Path) -> Result<Vec<Chunk>> {
        let docs = self.load(path)?;
        let chunks = self.split(&docs);

        tracing::info!(
            "Split '{}' into {} chunks ({} documents, {} chars, {} splitter)",
            path.display(),
            chunks.len(),
            docs.len(),
            docs.iter().map(Document::char_len).sum::<usize>(),
            self.splitter.name()
        );

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitterKind;
    use crate::ingestion::CharacterSplitter;

    #[test]
    fn test_text_file_with_character_splitter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "x".repeat(2500)).unwrap();

        let config = ChunkingConfig {
            splitter: SplitterKind::Character,
            ..ChunkingConfig::default()
        };
        let chunks = IngestPipeline::new(&config).run(&path).unwrap();

        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.source == path.to_string_lossy()));
    }

    #[test]
    fn test_recursive_splitter_on_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "# Title\n\nIntro text.\n\n## Usage\n\nRun it.").unwrap();

        let chunks = IngestPipeline::new(&ChunkingConfig::default())
            .run(&path)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("# Title"));
        assert!(chunks[0].content.ends_with("Run it."));
    }

    #[test]
    fn test_missing_file_propagates() {
        let pipeline = IngestPipeline::with_splitter(Box::new(CharacterSplitter::default()));
        assert!(pipeline.run(Path::new("/no/such/upload.txt")).is_err());
    }
}

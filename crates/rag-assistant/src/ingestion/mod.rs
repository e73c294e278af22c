//! Document ingestion: loading and splitting

pub mod loader;
mod pipeline;
pub mod splitter;

pub use loader::{loader_for_path, DocumentLoader, LoaderKind, TextLoader};
pub use pipeline::IngestPipeline;
pub use splitter::{splitter_for, CharacterSplitter, RecursiveSplitter, TextSplitter};

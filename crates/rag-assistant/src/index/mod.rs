//! Vector index: building, persisting and searching

pub mod indexer;
pub mod repository;
pub mod store;

pub use indexer::Indexer;
pub use repository::{FsIndexRepository, IndexRepository, MemoryIndexRepository};
pub use store::{IndexEntry, ScoredChunk, VectorIndex};

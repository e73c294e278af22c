//! Persistence for the single vector index

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::store::VectorIndex;

/// File name of the persisted index inside the index directory
pub const INDEX_FILE: &str = "index.json";

/// Storage for the one index the assistant answers from
#[async_trait]
pub trait IndexRepository: Send + Sync {
    /// Load the current index, `None` if nothing has been ingested yet
    async fn load(&self) -> Result<Option<VectorIndex>>;

    /// Replace the current index entirely
    async fn replace(&self, index: &VectorIndex) -> Result<()>;

    /// Whether an index has been persisted
    async fn exists(&self) -> Result<bool>;

    /// Repository name for logging
    fn name(&self) -> &str;
}

/// Index stored as JSON in a directory on disk
pub struct FsIndexRepository {
    dir: PathBuf,
}

impl FsIndexRepository {
    /// Create a repository rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the index
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }
}

#[async_trait]
impl IndexRepository for FsIndexRepository {
    async fn load(&self) -> Result<Option<VectorIndex>> {
        let path = self.index_path();
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let index: VectorIndex = serde_json::from_slice(&raw).map_err(|e| {
            Error::index(format!("Corrupt index at {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            "Loaded index {} ({} chunks, {} dims)",
            index.id,
            index.len(),
            index.dimensions
        );
        Ok(Some(index))
    }

    async fn replace(&self, index: &VectorIndex) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.index_path();
        if tokio::fs::try_exists(&path).await? {
            tracing::warn!(
                "Replacing existing index at {}; previously ingested documents will no longer be searchable",
                path.display()
            );
        }

        // Rename keeps readers from ever seeing a half-written file
        let tmp = self.dir.join(format!(".{}.{}.tmp", INDEX_FILE, Uuid::new_v4()));
        let payload = serde_json::to_vec(index)?;
        tokio::fs::write(&tmp, payload).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(
            "Persisted index {} ({} chunks) to {}",
            index.id,
            index.len(),
            path.display()
        );
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.index_path()).await?)
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

/// Index held in memory, lost on restart
#[derive(Default)]
pub struct MemoryIndexRepository {
    index: RwLock<Option<VectorIndex>>,
}

impl MemoryIndexRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexRepository for MemoryIndexRepository {
    async fn load(&self) -> Result<Option<VectorIndex>> {
        Ok(self.index.read().await.clone())
    }

    async fn replace(&self, index: &VectorIndex) -> Result<()> {
        let mut slot = self.index.write().await;
        if slot.is_some() {
            tracing::warn!("Replacing existing in-memory index");
        }
        *slot = Some(index.clone());
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.index.read().await.is_some())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

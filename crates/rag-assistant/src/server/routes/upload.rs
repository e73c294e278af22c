//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// POST /upload - save a document and rebuild the index from it
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(safe_filename)
            .ok_or_else(|| Error::BadRequest("No filename provided".into()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Upload(format!("could not read upload: {}", e)))?;

        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload
        .ok_or_else(|| Error::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD)))?;

    tracing::info!("Received upload: {} ({} bytes)", filename, data.len());

    let path = save_upload(&state.config().storage.upload_dir, &filename, &data).await?;
    let chunks = ingest(&state, path).await.map_err(Error::ingest)?;

    tracing::info!(
        "Ingested {} into {} chunks in {:?}",
        filename,
        chunks,
        start.elapsed()
    );

    Ok(Json(UploadResponse::ingested(chunks, filename)))
}

/// Final path component of a client-supplied name, rejecting empty and dot names
fn safe_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        base => Some(base.to_string()),
    }
}

/// Write the upload into `dir`, replacing any file of the same name
async fn save_upload(dir: &Path, filename: &str, data: &[u8]) -> Result<PathBuf> {
    let path = dir.join(filename);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Upload(e.to_string()))?;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| Error::Upload(e.to_string()))?;
    Ok(path)
}

/// Load, split, embed and persist the saved file
async fn ingest(state: &AppState, path: PathBuf) -> Result<usize> {
    let indexer = state.indexer()?;
    let pipeline = state.ingest_pipeline();

    let chunks = tokio::task::spawn_blocking(move || pipeline.run(&path))
        .await
        .map_err(|e| Error::Internal(format!("Ingest task panicked: {}", e)))??;

    indexer.index(chunks).await
}

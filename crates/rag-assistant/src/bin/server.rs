//! RAG assistant server binary
//!
//! Run with: cargo run -p rag-assistant --bin rag-assistant-server

use rag_assistant::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_assistant=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - API base: {}", config.llm.base_url);
    let api_key = if config.llm.api_key.is_some() {
        "set"
    } else {
        "missing"
    };
    tracing::info!("  - API key: {}", api_key);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Chat model: {}", config.llm.chat_model);
    tracing::info!(
        "  - Chunking: {:?}, size {}, overlap {}",
        config.chunking.splitter,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Uploads: {}", config.storage.upload_dir.display());
    tracing::info!("  - Index: {}", config.storage.index_dir.display());

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  UI:     http://{}/", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload - Upload and ingest a document");
    println!("  POST /chat   - Ask a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

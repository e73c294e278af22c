//! End-to-end tests of the HTTP API with in-process providers

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use rag_assistant::{
    config::{ChunkingConfig, SplitterKind},
    embeddings::EmbeddingProvider,
    generation::LlmProvider,
    index::{FsIndexRepository, IndexRepository},
    server::{state::AppState, RagServer},
    RagConfig, Result,
};

const DIMS: usize = 64;

/// Hashes character trigrams into a fixed number of buckets
struct TrigramEmbedder;

#[async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIMS];
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        for window in chars.windows(3) {
            let hash = window
                .iter()
                .fold(7u64, |h, c| h.wrapping_mul(31).wrapping_add(*c as u64));
            vector[(hash % DIMS as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "trigram-64"
    }

    fn name(&self) -> &str {
        "trigram"
    }
}

/// Rewrites follow-ups to a fixed question and echoes the question it answers
struct EchoLlm;

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.ends_with("Standalone question:") {
            return Ok("How does rust ownership work?".to_string());
        }
        let question = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Question: "))
            .unwrap_or_default();
        Ok(format!("echo: {}", question))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

struct TestApp {
    dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::build(true, |_| {})
    }

    /// Default chunking, i.e. the recursive splitter
    fn with_default_chunking() -> Self {
        Self::build(true, |config| config.chunking = ChunkingConfig::default())
    }

    fn build(with_providers: bool, tweak: impl FnOnce(&mut RagConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.index_dir = dir.path().join("vector_index");
        config.chunking.splitter = SplitterKind::Character;
        tweak(&mut config);

        let repository: Arc<dyn IndexRepository> =
            Arc::new(FsIndexRepository::new(config.storage.index_dir.clone()));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramEmbedder);
        let llm: Arc<dyn LlmProvider> = Arc::new(EchoLlm);
        let (embedder, llm) = if with_providers {
            (Some(embedder), Some(llm))
        } else {
            (None, None)
        };

        let state = AppState::with_providers(config, embedder, llm, repository);
        let router = RagServer::with_state(state).router();
        Self { dir, router }
    }

    fn uploads(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn upload(&self, filename: &str, content: &[u8]) -> (StatusCode, Value) {
        self.send(multipart("file", filename, content)).await
    }

    async fn chat(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

fn multipart(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "rag-assistant-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn index_page_is_served() {
    let app = TestApp::new();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/upload"));
    assert!(html.contains("/chat"));
}

#[tokio::test]
async fn chat_before_upload_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.chat(json!({ "question": "anything?" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No index found. Upload documents first.");
    assert_eq!(body["type"], "no_index");
}

#[tokio::test]
async fn upload_reports_chunk_count() {
    let app = TestApp::new();
    let content = "x".repeat(2500);
    let (status, body) = app.upload("notes.txt", content.as_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ingested", "chunks": 4, "filename": "notes.txt" })
    );
    assert_eq!(
        std::fs::read_to_string(app.uploads().join("notes.txt")).unwrap(),
        content
    );
}

#[tokio::test]
async fn unknown_extension_is_read_as_text() {
    let app = TestApp::new();
    let (status, body) = app.upload("data.xyz", b"plain words in a strange file").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 1);
}

#[tokio::test]
async fn upload_filename_cannot_escape_upload_dir() {
    let app = TestApp::new();
    let (status, body) = app.upload("../../escape.txt", b"contained").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "escape.txt");
    assert!(app.uploads().join("escape.txt").exists());
    assert!(!app.dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.send(multipart("attachment", "a.txt", b"hi")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "bad_request");
}

#[tokio::test]
async fn second_upload_replaces_first() {
    let app = TestApp::new();
    let (status, _) = app.upload("first.txt", "x".repeat(2500).as_bytes()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .upload("second.md", b"rust ownership moves values between bindings")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 1);

    let (status, body) = app.chat(json!({ "question": "rust ownership" })).await;
    assert_eq!(status, StatusCode::OK);
    let sources = body["source_documents"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(
        sources[0]["page_content"],
        "rust ownership moves values between bindings"
    );

    // Raw uploads are kept
    assert!(app.uploads().join("first.txt").exists());
}

#[tokio::test]
async fn default_splitter_keeps_paragraphs_apart() {
    let app = TestApp::with_default_chunking();
    let paragraph = "a".repeat(600);
    let text = [paragraph.as_str(); 3].join("\n\n");

    let (status, body) = app.upload("essay.md", text.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 3);

    let (status, body) = app.chat(json!({ "question": "aaaa" })).await;
    assert_eq!(status, StatusCode::OK);
    let sources = body["source_documents"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert!(sources.iter().all(|s| s["page_content"] == paragraph.as_str()));
}

#[tokio::test]
async fn blank_upload_keeps_existing_index() {
    let app = TestApp::with_default_chunking();
    let (status, _) = app
        .upload("notes.txt", b"rust ownership moves values")
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.upload("blank.txt", b"   \n\n  ").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "ingest_error");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Ingest failed: "));

    let (status, body) = app.chat(json!({ "question": "rust ownership" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["source_documents"][0]["page_content"],
        "rust ownership moves values"
    );
}

#[tokio::test]
async fn chat_answers_with_sources() {
    let app = TestApp::new();
    app.upload("doc.txt", "a".repeat(3000).as_bytes()).await;

    let (status, body) = app
        .chat(json!({ "question": "What is in the doc?", "chat_history": [] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "echo: What is in the doc?");
    assert_eq!(body["source_documents"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn chat_history_condenses_question() {
    let app = TestApp::new();
    app.upload("doc.txt", b"rust ownership and borrowing").await;

    let (status, body) = app
        .chat(json!({
            "question": "how does it work?",
            "chat_history": [["what is rust?", "a language"], ["is it fast?", null]]
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "echo: How does rust ownership work?");
}

#[tokio::test]
async fn source_previews_are_truncated() {
    let app = TestApp::build(true, |config| config.retrieval.preview_chars = 10);
    app.upload("long.txt", "é".repeat(500).as_bytes()).await;

    let (status, body) = app.chat(json!({ "question": "accents" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source_documents"][0]["page_content"], "é".repeat(10));
}

#[tokio::test]
async fn empty_question_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.chat(json!({ "question": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "bad_request");
}

#[tokio::test]
async fn malformed_chat_body_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.chat(json!({ "chat_history": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn upload_without_credentials_fails_ingest() {
    let app = TestApp::build(false, |_| {});
    let (status, body) = app.upload("notes.txt", b"some text").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Ingest failed: "));
    assert_eq!(body["type"], "ingest_error");
    // Saved before ingest was attempted
    assert!(app.uploads().join("notes.txt").exists());
}

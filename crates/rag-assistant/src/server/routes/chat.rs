//! Chat endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /chat - answer a question from the current index
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;

    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::BadRequest("Question must not be empty".into()));
    }

    if !state.repository().exists().await? {
        return Err(Error::NoIndex);
    }

    tracing::info!(
        "Chat question ({} chars, {} history turns)",
        question.chars().count(),
        request.chat_history.len()
    );

    let answered = async {
        state
            .query_pipeline()?
            .query(question, &request.chat_history)
            .await
    }
    .await;

    match answered {
        Ok(result) => Ok(Json(result.into())),
        Err(Error::NoIndex) => Err(Error::NoIndex),
        Err(e) => Err(Error::chain(e)),
    }
}

//! Chat request types

use serde::{Deserialize, Serialize};

/// One earlier exchange, resent by the client on every request.
///
/// On the wire a turn is a two-element array `[question, answer]`; a `null`
/// answer (the page sends one when a request failed) reads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Option<String>)", into = "(String, String)")]
pub struct ConversationTurn {
    /// What the user asked
    pub question: String,
    /// What the assistant answered
    pub answer: String,
}

impl ConversationTurn {
    /// Create a new turn
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

impl From<(String, Option<String>)> for ConversationTurn {
    fn from((question, answer): (String, Option<String>)) -> Self {
        Self {
            question,
            answer: answer.unwrap_or_default(),
        }
    }
}

impl From<ConversationTurn> for (String, String) {
    fn from(turn: ConversationTurn) -> Self {
        (turn.question, turn.answer)
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    pub question: String,
    /// Earlier turns of the conversation, oldest first
    #[serde(default)]
    pub chat_history: Vec<ConversationTurn>,
}

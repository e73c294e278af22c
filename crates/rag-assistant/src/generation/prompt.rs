//! Prompt templates for conversational retrieval

use crate::types::{Chunk, ConversationTurn};

/// Prompt builder for the query pipeline
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render history as alternating `Human:` / `Assistant:` lines
    pub fn format_history(history: &[ConversationTurn]) -> String {
        history
            .iter()
            .map(|turn| format!("Human: {}\nAssistant: {}", turn.question, turn.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Join retrieved chunk texts into one context block
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Ask the model to turn a follow-up into a standalone question
    pub fn build_condense_prompt(question: &str, history: &[ConversationTurn]) -> String {
        format!(
            r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{history}
Follow Up Input: {question}
Standalone question:"#,
            history = Self::format_history(history),
            question = question
        )
    }

    /// Build the answer prompt from retrieved context
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condense_prompt_includes_history() {
        let history = vec![
            ConversationTurn::new("Who wrote the report?", "Grace."),
            ConversationTurn::new("When?", "In 1952."),
        ];
        let prompt = PromptBuilder::build_condense_prompt("Where did she work?", &history);

        assert!(prompt.contains("Human: Who wrote the report?\nAssistant: Grace.\nHuman: When?\nAssistant: In 1952."));
        assert!(prompt.contains("Follow Up Input: Where did she work?"));
        assert!(prompt.ends_with("Standalone question:"));
    }

    #[test]
    fn test_qa_prompt_contains_context_in_order() {
        let chunks = vec![Chunk::new("alpha", "a.txt"), Chunk::new("beta", "b.txt")];
        let context = PromptBuilder::build_context(&chunks);
        assert_eq!(context, "alpha\n\nbeta");

        let prompt = PromptBuilder::build_qa_prompt("What?", &context);
        assert!(prompt.contains("alpha\n\nbeta\n\nQuestion: What?"));
        assert!(prompt.ends_with("Helpful Answer:"));
    }
}

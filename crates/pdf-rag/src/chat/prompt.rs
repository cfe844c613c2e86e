//! Prompt templates for retrieval-augmented chat

use std::collections::{BTreeSet, HashMap};

use crate::types::ScoredChunk;

/// Separator between retrieved chunks in the prompt context
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Prompt builder for chat turns
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, best match first
    pub fn build_context(results: &[ScoredChunk]) -> String {
        results
            .iter()
            .map(|result| result.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_DELIMITER)
    }

    /// Summarize which documents and pages the results came from.
    ///
    /// Sources appear in first-seen order; pages are 1-based, sorted, and
    /// deduplicated. Example:
    /// `Source: doc.pdf, Pages: [1, 3] | Source: other.pdf, Pages: [2] | `
    pub fn format_sources(results: &[ScoredChunk]) -> String {
        let mut order: Vec<&str> = Vec::new();
        let mut pages: HashMap<&str, BTreeSet<u32>> = HashMap::new();

        for result in results {
            let source = result.metadata.source.as_str();
            if !pages.contains_key(source) {
                order.push(source);
            }
            pages.entry(source).or_default().insert(result.metadata.page + 1);
        }

        let mut formatted = String::new();
        for source in order {
            let listed: Vec<String> = pages[source].iter().map(u32::to_string).collect();
            formatted.push_str(&format!(
                "Source: {}, Pages: [{}] | ",
                source,
                listed.join(", ")
            ));
        }
        formatted
    }

    /// Build the full chat prompt around the user's question
    pub fn build_chat_prompt(question: &str, context: &str, sources: &str) -> String {
        format!(
            r#"You are a helpful and knowledgeable assistant. Your job is to answer user questions using only the information provided in the context below and the conversation history.
You can also answer general questions if asked.

Instructions:
- Be specific and detailed in your answers.
- If the question is vague, ask for a more specific clarification.
- If the context does not provide any relevant information, tell the user to ask a more specific question.
- Only answer if you are absolutely sure you are correct. Otherwise, specify that you are unsure and provide reasoning.
- At the end of your response include a section for the sources you used in this format:
    Sources:
        - <source>, Page(s): <page_numbers>

Context:
{context}

Sources:
{sources}

---

Now, answer the following question using only the context. Do not mention the context in your response unless explicitly asked.
Make sure to cite your sources. Don't be afraid to ask for clarification if needed.

Question:
{question}"#,
            context = context,
            sources = sources,
            question = question
        )
    }
}

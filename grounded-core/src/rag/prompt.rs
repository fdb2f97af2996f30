//! Prompt rendering.

use super::context::Context;
use super::types::PromptRecord;

/// Instruction placed at the top of every prompt unless overridden.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful assistant. Answer the question using only the \
information in the context below. If the context does not contain the answer, say that you do not know.";

/// Renders prompts from a fixed template.
///
/// The template is: instruction, a `Context:` block, a `Question:` line, and
/// an `Answer:` cue. Rendering is a pure function of the query and context.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instruction: String,
}

impl PromptBuilder {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    pub fn build(&self, query: &str, context: &Context) -> PromptRecord {
        let context_text = context.text();
        let rendered_prompt = format!(
            "{}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
            self.instruction.trim(),
            context_text,
            query.trim()
        );

        PromptRecord {
            query: query.to_string(),
            context: context_text,
            rendered_prompt,
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTION)
    }
}

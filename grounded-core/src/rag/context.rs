//! Context assembly from ranked passages.

use super::types::RankedResult;
use std::collections::HashSet;
use tracing::debug;

/// Separator placed between passages in the rendered context.
pub const PASSAGE_DELIMITER: &str = "\n\n";

/// Ordered passages selected for one query, most relevant first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    ids: Vec<String>,
    passages: Vec<String>,
}

impl Context {
    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Renders the passages as one block, separated by [`PASSAGE_DELIMITER`].
    pub fn text(&self) -> String {
        self.passages.join(PASSAGE_DELIMITER)
    }

    /// Number of chars in [`text`](Self::text), without rendering it.
    pub fn char_count(&self) -> usize {
        let delimiters = self.passages.len().saturating_sub(1) * PASSAGE_DELIMITER.chars().count();
        self.passages.iter().map(|p| p.chars().count()).sum::<usize>() + delimiters
    }
}

/// Turns a [`RankedResult`] into a bounded [`Context`].
///
/// Passages are taken whole in ranking order. When a character budget is
/// set, the context stops at the first passage that would overflow it, so the
/// lowest-ranked passages are the ones dropped and no passage is ever cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, ranked: &RankedResult, max_chars: Option<usize>) -> Context {
        let mut context = Context::default();
        let mut seen = HashSet::new();
        let mut used = 0usize;
        let delimiter_len = PASSAGE_DELIMITER.chars().count();

        for result in ranked {
            let document = &result.document;
            if !seen.insert(document.id.as_str()) {
                continue;
            }

            let passage_len = document.text.chars().count();
            let needed = if context.is_empty() {
                passage_len
            } else {
                passage_len + delimiter_len
            };

            if let Some(limit) = max_chars {
                if used + needed > limit {
                    debug!(
                        kept = context.len(),
                        dropped_from = %document.id,
                        limit,
                        "Context budget reached"
                    );
                    break;
                }
            }

            used += needed;
            context.ids.push(document.id.clone());
            context.passages.push(document.text.clone());
        }

        context
    }
}

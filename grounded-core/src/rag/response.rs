//! Splitting model output into reasoning and answer.
//!
//! Reasoning models wrap their intermediate thoughts in a marker pair:
//!
//! ```text
//! <think>The plan lists a dental deductible.</think>Your deductible is $50.
//! ```
//!
//! The split is a single pass over the text. Nested or repeated marker pairs
//! are not supported and are treated like missing markers.

pub const OPEN_MARKER: &str = "<think>";
pub const CLOSE_MARKER: &str = "</think>";

/// Answer reported when the output has no well-formed marker pair.
pub const NO_ANSWER_SENTINEL: &str = "No explicit response found.";

/// Model output split into its two parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposed {
    pub reasoning: String,
    pub answer: String,
}

/// Splits raw model output into reasoning and answer.
///
/// With exactly one opening marker followed by exactly one closing marker,
/// the answer is the trimmed text after the closing marker, and the reasoning
/// is the trimmed text between the markers, preceded by any text found before
/// the opening marker. Any other layout puts the whole raw text, untouched, in
/// `reasoning` and [`NO_ANSWER_SENTINEL`] in `answer`.
///
/// # Example
///
/// ```
/// # use grounded_core::rag::response::{decompose, NO_ANSWER_SENTINEL};
/// let parts = decompose("<think>A</think>B");
/// assert_eq!(parts.reasoning, "A");
/// assert_eq!(parts.answer, "B");
///
/// let parts = decompose("no markers here");
/// assert_eq!(parts.reasoning, "no markers here");
/// assert_eq!(parts.answer, NO_ANSWER_SENTINEL);
/// ```
pub fn decompose(raw: &str) -> Decomposed {
    match split_markers(raw) {
        Some((before, inside, after)) => {
            let reasoning = match before.trim() {
                "" => inside.trim().to_string(),
                prefix => format!("{}\n{}", prefix, inside.trim()),
            };
            Decomposed {
                reasoning,
                answer: after.trim().to_string(),
            }
        }
        None => Decomposed {
            reasoning: raw.to_string(),
            answer: NO_ANSWER_SENTINEL.to_string(),
        },
    }
}

/// Returns `(before, inside, after)` when the markers appear exactly once each, in order.
fn split_markers(raw: &str) -> Option<(&str, &str, &str)> {
    if raw.matches(OPEN_MARKER).count() != 1 || raw.matches(CLOSE_MARKER).count() != 1 {
        return None;
    }

    let open = raw.find(OPEN_MARKER)?;
    let close = raw.find(CLOSE_MARKER)?;
    let inside_start = open + OPEN_MARKER.len();
    if close < inside_start {
        return None;
    }

    Some((
        &raw[..open],
        &raw[inside_start..close],
        &raw[close + CLOSE_MARKER.len()..],
    ))
}

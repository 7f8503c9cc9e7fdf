//! Token estimation.

/// Estimates the token count of a text.
///
/// Uses the 4-characters-per-token heuristic; close enough for budget
/// gating without pulling in a tokenizer. Always returns at least 1.
pub fn estimate_tokens(text: &str) -> usize {
    ((text.len() as f64) / 4.0).ceil().max(1.0) as usize
}

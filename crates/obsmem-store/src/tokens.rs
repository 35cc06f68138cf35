//! Token estimation utilities

/// Average characters per token for markdown-heavy memory documents
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 3.5;

/// Length in characters (not bytes); budgets are expressed in characters
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Estimate token count from a character count
///
/// This is a flat chars-per-token heuristic, not a tokenizer. It is only
/// used to decide whether an oracle call fits the input budget. A
/// non-positive ratio falls back to [`DEFAULT_CHARS_PER_TOKEN`].
pub fn estimate_tokens(chars: usize, chars_per_token: f64) -> usize {
    if chars == 0 {
        return 0;
    }
    let ratio = if chars_per_token.is_finite() && chars_per_token > 0.0 {
        chars_per_token
    } else {
        DEFAULT_CHARS_PER_TOKEN
    };
    (chars as f64 / ratio).ceil() as usize
}

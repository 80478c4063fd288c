//! Prompt preparation helpers.

/// Collapses every run of whitespace (including newlines) to one space and trims the ends.
pub fn normalize_prompt(prompt: &str) -> String {
    prompt.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Approximate token budget for a word limit: `floor(word_limit * 4 / 3)`, saturating at `u32::MAX`.
pub fn word_limit_to_tokens(word_limit: u32) -> u32 {
    u32::try_from(u64::from(word_limit) * 4 / 3).unwrap_or(u32::MAX)
}

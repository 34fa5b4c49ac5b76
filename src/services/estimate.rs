//! Fallbacks for operations the gateway has no native endpoint for
//!
//! Portkey exposes no token counting endpoint, so token counts are an
//! approximation of roughly four characters per token. It is not a tokenizer
//! and callers cannot tell the estimate from an exact count.

use crate::messages::NormalizedMessage;

/// Characters assumed per token by [`estimate_tokens`]
pub const CHARS_PER_TOKEN: usize = 4;

/// Embedding model used when the request names none
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Estimate the token count of `messages`.
///
/// Texts are concatenated without separators and the count is
/// `ceil(chars / 4)`, where chars counts Unicode scalar values.
#[must_use]
pub fn estimate_tokens(messages: &[NormalizedMessage]) -> u32 {
    let chars: usize = messages.iter().map(|m| m.text.chars().count()).sum();
    u32::try_from(chars.div_ceil(CHARS_PER_TOKEN)).unwrap_or(u32::MAX)
}

/// Join `messages` into one embedding input, single-space separated
#[must_use]
pub fn embedding_input(messages: &[NormalizedMessage]) -> String {
    messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

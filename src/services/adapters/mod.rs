//! Wire-format adapters
//!
//! This module provides adapters for translating between the internal
//! content shape and provider-specific API formats.

pub mod chat_completions;

pub use chat_completions::{
    build_request, translate_response, ChatCompletionChunk, ChatCompletionRequest,
    ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse, WireResponseChunk, WireUsage,
};

//! Streaming support for chat completion responses
//!
//! Provides the line parser for Server-Sent Events (SSE) bodies and the
//! decoder that turns them into response fragments.

pub mod chat_stream;
pub mod sse_parser;

pub use chat_stream::{decode_stream, ChatStreamDecoder, DecoderState};
pub use sse_parser::{SseLine, SseParser};

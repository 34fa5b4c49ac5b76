//! Chat completions stream decoder
//!
//! Turns the raw SSE body of a streaming `/chat/completions` call into
//! internal response fragments, one per delta that carries text.

use std::fmt::Display;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use tracing::{debug, trace};

use crate::{
    error::{AdapterError, Result},
    services::{
        adapters::{translate_response, ChatCompletionChunk},
        GenerateContentResponse,
    },
};

use super::{SseLine, SseParser};

/// Where the decoder is in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No partial line buffered
    AwaitingBytes,

    /// Bytes of an unterminated line are buffered
    HavePartialLine,

    /// The byte stream ended normally
    Done,

    /// Reading the byte stream failed
    Failed,
}

/// Decoder state for one streaming response
///
/// Owns the line buffer. Malformed frames are skipped one line at a time and
/// never abort the stream.
#[derive(Debug)]
pub struct ChatStreamDecoder {
    parser: SseParser,
    state: DecoderState,
}

impl ChatStreamDecoder {
    /// Create a new decoder
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: SseParser::new(),
            state: DecoderState::AwaitingBytes,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one read of the body and return the fragments it completed
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<GenerateContentResponse> {
        if self.is_terminal() {
            return Vec::new();
        }

        let responses = self
            .parser
            .parse_chunk(bytes)
            .into_iter()
            .filter_map(Self::decode_line)
            .collect();

        self.state = if self.parser.pending() > 0 {
            DecoderState::HavePartialLine
        } else {
            DecoderState::AwaitingBytes
        };
        responses
    }

    /// Mark the byte stream as ended; a trailing partial line is dropped
    pub fn finish(&mut self) {
        self.parser.finish();
        self.state = DecoderState::Done;
    }

    /// Mark the byte stream as failed
    pub fn fail(&mut self) {
        self.parser.finish();
        self.state = DecoderState::Failed;
    }

    const fn is_terminal(&self) -> bool {
        matches!(self.state, DecoderState::Done | DecoderState::Failed)
    }

    fn decode_line(line: SseLine) -> Option<GenerateContentResponse> {
        let payload = match line {
            SseLine::Done => return None,
            SseLine::Data(payload) => payload,
        };

        match serde_json::from_str::<ChatCompletionChunk>(&payload) {
            Ok(frame) => frame.into_wire_chunk().map(translate_response),
            Err(e) => {
                trace!(error = %e, "skipping malformed stream frame");
                None
            }
        }
    }
}

impl Default for ChatStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a streaming body into response fragments
///
/// Each read is decoded and its fragments are yielded before the next read is
/// issued. The body stream is owned by the returned stream, so dropping it
/// early releases the connection. A failed read yields one error and ends the
/// stream.
pub fn decode_stream<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<GenerateContentResponse>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = ChatStreamDecoder::new();
        let mut byte_stream = Box::pin(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(bytes) => {
                    for response in decoder.feed(&bytes) {
                        yield Ok(response);
                    }
                }
                Err(e) => {
                    decoder.fail();
                    debug!(error = %e, "stream read failed");
                    yield Err(AdapterError::StreamRead(e.to_string()));
                    break;
                }
            }
        }

        if decoder.state() != DecoderState::Failed {
            decoder.finish();
        }
    }
}

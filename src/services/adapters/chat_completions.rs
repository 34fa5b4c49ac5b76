//! OpenAI Chat Completions wire format
//!
//! Request and response types for `/chat/completions` and `/embeddings`, and
//! the translations between them and the internal content shape.

use serde::{Deserialize, Serialize};

use crate::{
    messages::{NormalizedMessage, Role},
    services::{GenerateContentResponse, GenerationConfig, UsageMetadata},
};

/// Finish reason reported when the gateway does not send one
pub const DEFAULT_FINISH_REASON: &str = "STOP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Build the chat completions request for `messages`.
///
/// An empty message list is passed through unchanged.
#[must_use]
pub fn build_request(
    messages: Vec<NormalizedMessage>,
    config: Option<&GenerationConfig>,
    model: &str,
    stream: bool,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: messages
            .into_iter()
            .map(|msg| ChatMessage {
                role: msg.role,
                content: msg.text,
            })
            .collect(),
        stream,
        max_tokens: config.and_then(|c| c.max_output_tokens),
        temperature: config.and_then(|c| c.temperature),
        top_p: config.and_then(|c| c.top_p),
    }
}

/// Token counts as the gateway reports them; any field may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl From<WireUsage> for UsageMetadata {
    fn from(usage: WireUsage) -> Self {
        Self {
            prompt_token_count: usage.prompt_tokens.unwrap_or(0),
            candidates_token_count: usage.completion_tokens.unwrap_or(0),
            total_token_count: usage.total_tokens.unwrap_or(0),
        }
    }
}

/// Non-streaming `/chat/completions` response body
///
/// Every field is optional so that sparse gateway answers still translate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ResponseChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ResponseMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One streamed `chat.completion.chunk` frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ChunkChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChunkDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A decoded unit from either a full response or one stream frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireResponseChunk {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<WireUsage>,
}

impl From<ChatCompletionResponse> for WireResponseChunk {
    fn from(response: ChatCompletionResponse) -> Self {
        let choice = response.choices.and_then(|c| c.into_iter().next());
        let (text, finish_reason) = match choice {
            Some(choice) => (
                choice.message.and_then(|m| m.content).unwrap_or_default(),
                choice.finish_reason,
            ),
            None => (String::new(), None),
        };

        Self {
            text,
            finish_reason,
            usage: response.usage,
        }
    }
}

impl ChatCompletionChunk {
    /// The frame's first-choice delta, if it carries new text
    ///
    /// Frames with only a role, a finish reason, or usage yield `None`.
    #[must_use]
    pub fn into_wire_chunk(self) -> Option<WireResponseChunk> {
        let choice = self.choices?.into_iter().next()?;
        let text = choice.delta?.content.filter(|t| !t.is_empty())?;

        Some(WireResponseChunk {
            text,
            finish_reason: choice.finish_reason,
            usage: self.usage,
        })
    }
}

/// Translate a wire chunk into the internal response shape
///
/// Always yields exactly one assistant candidate at index 0.
#[must_use]
pub fn translate_response(chunk: WireResponseChunk) -> GenerateContentResponse {
    let finish_reason = chunk
        .finish_reason
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string());

    GenerateContentResponse::single(
        chunk.text,
        finish_reason,
        chunk.usage.map(UsageMetadata::from).unwrap_or_default(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: String,
}

/// `/embeddings` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<EmbeddingData>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl EmbeddingResponse {
    /// First embedding vector, empty when the gateway sent none
    #[must_use]
    pub fn into_first_vector(self) -> Vec<f32> {
        self.data
            .and_then(|data| data.into_iter().next())
            .and_then(|d| d.embedding)
            .unwrap_or_default()
    }
}

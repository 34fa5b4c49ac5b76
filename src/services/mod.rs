//! Service layer for content generation backends
//!
//! This module defines the uniform operation surface ([`ContentGenerator`])
//! and the internal request/response shapes it speaks. Backends:
//! - Portkey (OpenAI-compatible gateway)

pub mod adapters;
pub mod estimate;
pub mod portkey;
pub mod streaming;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::{
    config::{auth::AuthType, AdapterConfig},
    error::{AdapterError, Result},
    messages::{Content, Contents, Part, Role},
};

/// Generation parameters forwarded to the backend
///
/// Absent fields are left out of the outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p for nucleus sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// Parameters of a content generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentParameters {
    pub contents: Contents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
}

impl GenerateContentParameters {
    #[must_use]
    pub fn new(contents: impl Into<Contents>) -> Self {
        Self {
            contents: contents.into(),
            config: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Parameters of a token counting request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountTokensParameters {
    pub contents: Contents,
}

/// Parameters of an embedding request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedContentParameters {
    pub contents: Contents,

    /// Embedding model; the backend default is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Content of a response candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContent {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// One proposed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: CandidateContent,
    pub finish_reason: String,
    pub index: u32,
}

impl From<&Candidate> for Content {
    /// Turn a reply back into a `model` turn for the next request's history
    fn from(candidate: &Candidate) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: candidate.content.parts.clone(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: u64,
    pub candidates_token_count: u64,
    pub total_token_count: u64,
}

/// A function call proposed by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// Response from a content generation request, or one streamed fragment of it
///
/// The accessor methods are derived views and are not part of the
/// serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: UsageMetadata,
}

impl GenerateContentResponse {
    /// Build a single-candidate assistant response
    #[must_use]
    pub fn single(text: impl Into<String>, finish_reason: impl Into<String>, usage: UsageMetadata) -> Self {
        Self {
            candidates: vec![Candidate {
                content: CandidateContent {
                    role: Role::Assistant,
                    parts: vec![Part::text(text)],
                },
                finish_reason: finish_reason.into(),
                index: 0,
            }],
            usage_metadata: usage,
        }
    }

    /// Text of the first candidate, empty when there is none
    #[must_use]
    pub fn text(&self) -> &str {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or_default()
    }

    /// Finish reason of the first candidate
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first().map(|c| c.finish_reason.as_str())
    }

    #[must_use]
    pub const fn usage(&self) -> &UsageMetadata {
        &self.usage_metadata
    }

    /// Inline data output. The gateway never produces it.
    #[must_use]
    pub const fn data(&self) -> Option<&str> {
        None
    }

    /// Function calls. The gateway never produces them.
    #[must_use]
    pub const fn function_calls(&self) -> Option<&[FunctionCall]> {
        None
    }

    /// Executable code output. The gateway never produces it.
    #[must_use]
    pub const fn executable_code(&self) -> Option<&str> {
        None
    }

    /// Code execution result. The gateway never produces it.
    #[must_use]
    pub const fn code_execution_result(&self) -> Option<&str> {
        None
    }
}

/// Response from a token counting request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    pub total_tokens: u32,
}

/// A single embedding vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

/// Response from an embedding request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedContentResponse {
    pub embeddings: Vec<ContentEmbedding>,
}

/// Stream of generated fragments
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Core trait for content generators
///
/// Abstracts over backends so callers keep one request/response shape
/// whichever provider serves them.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Get the provider name (e.g., "portkey")
    fn provider(&self) -> &str;

    /// Get the model name
    fn model(&self) -> &str;

    /// Generate a complete response
    async fn generate_content(&self, request: GenerateContentParameters) -> Result<GenerateContentResponse>;

    /// Generate a response as a stream of fragments
    async fn generate_content_stream(&self, request: GenerateContentParameters) -> Result<ContentStream>;

    /// Count tokens in the request contents
    async fn count_tokens(&self, request: CountTokensParameters) -> Result<CountTokensResponse>;

    /// Embed the request contents
    async fn embed_content(&self, request: EmbedContentParameters) -> Result<EmbedContentResponse>;
}

/// Create the content generator serving `auth_type`
///
/// # Errors
///
/// Returns [`AdapterError::UnsupportedProvider`] for auth types served by the
/// native SDK, or a configuration error if the Portkey config is invalid.
pub fn create_content_generator(
    auth_type: AuthType,
    config: AdapterConfig,
) -> Result<Box<dyn ContentGenerator>> {
    match auth_type {
        AuthType::UsePortkey => Ok(Box::new(portkey::PortkeyContentGenerator::new(config)?)),
        other => Err(AdapterError::UnsupportedProvider {
            provider: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accessors_are_not_serialized() {
        let response = GenerateContentResponse::single("hi", "STOP", UsageMetadata::default());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "candidates": [{
                    "content": {"role": "assistant", "parts": [{"text": "hi"}]},
                    "finishReason": "STOP",
                    "index": 0
                }],
                "usageMetadata": {
                    "promptTokenCount": 0,
                    "candidatesTokenCount": 0,
                    "totalTokenCount": 0
                }
            })
        );
        assert_eq!(response.text(), "hi");
        assert!(response.data().is_none());
        assert!(response.function_calls().is_none());
        assert!(response.executable_code().is_none());
        assert!(response.code_execution_result().is_none());
    }

    #[test]
    fn test_candidate_back_into_history() {
        let response = GenerateContentResponse::single("answer", "stop", UsageMetadata::default());
        let content = Content::from(&response.candidates[0]);
        assert_eq!(content, Content::model("answer"));
    }

    #[test]
    fn test_factory_rejects_native_auth() {
        let config = AdapterConfig::new("key", "gemini-2.5-pro");
        let err = create_content_generator(AuthType::UseGemini, config)
            .err()
            .unwrap();
        assert!(matches!(err, AdapterError::UnsupportedProvider { .. }));
    }

    #[test]
    fn test_generation_config_camel_case() {
        let config: GenerationConfig =
            serde_json::from_value(serde_json::json!({"maxOutputTokens": 64, "topP": 0.5})).unwrap();
        assert_eq!(config.max_output_tokens, Some(64));
        assert_eq!(config.top_p, Some(0.5));
        assert_eq!(config.temperature, None);
    }
}

//! Portkey gateway content generator
//!
//! Serves Gemini-style requests through Portkey's OpenAI-compatible
//! `/chat/completions` and `/embeddings` endpoints.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::AdapterConfig,
    error::{AdapterError, Result},
    messages::normalize,
};

use super::{
    adapters::{build_request, translate_response, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse},
    estimate::{embedding_input, estimate_tokens, DEFAULT_EMBEDDING_MODEL},
    streaming::decode_stream,
    ContentEmbedding, ContentGenerator, ContentStream, CountTokensParameters, CountTokensResponse,
    EmbedContentParameters, EmbedContentResponse, GenerateContentParameters, GenerateContentResponse,
};

/// Header carrying the gateway API key
pub const API_KEY_HEADER: &str = "x-portkey-api-key";

/// Portkey content generator
///
/// Immutable after construction and safe to share across concurrent calls.
#[derive(Debug, Clone)]
pub struct PortkeyContentGenerator {
    client: Client,
    config: AdapterConfig,
}

impl PortkeyContentGenerator {
    /// Create a new Portkey content generator
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] if the API key is empty, or
    /// [`AdapterError::InvalidConfig`] if it cannot be sent as a header.
    pub fn new(config: AdapterConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AdapterError::MissingApiKey {
                provider: "Portkey".to_string(),
            });
        }

        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                let mut api_key = header::HeaderValue::from_str(&config.api_key)
                    .map_err(|_| AdapterError::InvalidConfig("Invalid API key format".to_string()))?;
                api_key.set_sensitive(true);
                headers.insert(API_KEY_HEADER, api_key);
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// POST `body` to `path`, failing on any non-success status
    async fn post<T: Serialize + ?Sized>(&self, path: &str, api: &str, body: &T) -> Result<Response> {
        let url = self.config.endpoint(path);
        debug!(%url, model = %self.config.model, "sending gateway request");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "gateway responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(error = %e, "failed to read error response body");
                String::new()
            });
            warn!(status = status.as_u16(), api, "gateway request failed");
            return Err(AdapterError::Api {
                api: api.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ContentGenerator for PortkeyContentGenerator {
    fn provider(&self) -> &str {
        "portkey"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(&self, request: GenerateContentParameters) -> Result<GenerateContentResponse> {
        let messages = normalize(&request.contents);
        let body = build_request(messages, request.config.as_ref(), &self.config.model, false);

        let response = self.post("chat/completions", "Portkey", &body).await?;
        let api_response: ChatCompletionResponse = response.json().await?;

        Ok(translate_response(api_response.into()))
    }

    async fn generate_content_stream(&self, request: GenerateContentParameters) -> Result<ContentStream> {
        let messages = normalize(&request.contents);
        let body = build_request(messages, request.config.as_ref(), &self.config.model, true);

        let response = self.post("chat/completions", "Portkey", &body).await?;
        let byte_stream = response.bytes_stream();

        Ok(Box::pin(decode_stream(byte_stream)))
    }

    async fn count_tokens(&self, request: CountTokensParameters) -> Result<CountTokensResponse> {
        let messages = normalize(&request.contents);
        Ok(CountTokensResponse {
            total_tokens: estimate_tokens(&messages),
        })
    }

    async fn embed_content(&self, request: EmbedContentParameters) -> Result<EmbedContentResponse> {
        let messages = normalize(&request.contents);
        let body = EmbeddingRequest {
            model: request
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            input: embedding_input(&messages),
        };

        let response = self.post("embeddings", "Portkey Embeddings", &body).await?;
        let api_response: EmbeddingResponse = response.json().await?;

        Ok(EmbedContentResponse {
            embeddings: vec![ContentEmbedding {
                values: api_response.into_first_vector(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Content, Contents};

    #[test]
    fn test_missing_api_key() {
        let err = PortkeyContentGenerator::new(AdapterConfig::new("", "gpt-4o")).unwrap_err();
        assert!(matches!(err, AdapterError::MissingApiKey { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unusable_api_key() {
        let err = PortkeyContentGenerator::new(AdapterConfig::new("bad\nkey", "gpt-4o")).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidConfig(_)));
    }

    #[test]
    fn test_new_keeps_config() {
        let generator = PortkeyContentGenerator::new(
            AdapterConfig::new("pk", "gpt-4o").with_base_url("http://localhost:9/v1"),
        )
        .unwrap();
        assert_eq!(generator.provider(), "portkey");
        assert_eq!(generator.model(), "gpt-4o");
        assert_eq!(generator.config().base_url, "http://localhost:9/v1");
    }

    #[tokio::test]
    async fn test_count_tokens_needs_no_network() {
        // Unroutable endpoint: any request would fail
        let generator = PortkeyContentGenerator::new(
            AdapterConfig::new("pk", "m").with_base_url("http://127.0.0.1:1/v1"),
        )
        .unwrap();

        let contents: Contents = vec![Content::user("a".repeat(30)), Content::model("b".repeat(10))].into();
        let response = generator
            .count_tokens(CountTokensParameters { contents })
            .await
            .unwrap();
        assert_eq!(response.total_tokens, 10);
    }
}

//! Error types for the Portkey adapter

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`AdapterError`]
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Main error type for the adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be read or parsed
    #[error("Failed to parse settings at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Required credential missing at construction time
    #[error("{provider} API key is required")]
    MissingApiKey { provider: String },

    /// Configuration present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-success HTTP status from the gateway
    #[error("{api} API error: {status} {status_text}")]
    Api {
        api: String,
        status: u16,
        status_text: String,
        body: String,
    },

    /// Request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a streaming body failed after streaming started
    #[error("Stream read failed: {0}")]
    StreamRead(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Auth type not served by this crate
    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },
}

impl AdapterError {
    /// Whether this error came from the transport (HTTP status or body read)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Http(_) | Self::StreamRead(_))
    }

    /// Whether this error was raised while validating configuration
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey { .. } | Self::InvalidConfig(_) | Self::ConfigParse { .. }
        )
    }

    /// HTTP status code, when the gateway answered with one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

//! Configuration management for the adapter
//!
//! Values are resolved in order of precedence:
//! 1. CLI parameters (highest priority)
//! 2. Environment variables (and `.env`)
//! 3. Settings file (`<config dir>/portkey-adapter/settings.json`)
//! 4. Built-in defaults

pub mod auth;
pub mod settings;

use std::{fmt, path::PathBuf};

pub use self::{
    auth::{validate_auth_method, AuthType},
    settings::Settings,
};
use crate::error::{AdapterError, Result};

/// Gateway endpoint used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://api.portkey.ai/v1";

/// Environment variable holding the gateway API key
pub const API_KEY_ENV: &str = "PORTKEY_API_KEY";

/// Environment variable overriding the gateway endpoint
pub const BASE_URL_ENV: &str = "PORTKEY_BASE_URL";

/// Environment variable naming the model
pub const MODEL_ENV: &str = "PORTKEY_MODEL";

/// Connection settings for the Portkey content generator
///
/// Validated once when the generator is constructed and never changed
/// afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Gateway API key; must be non-empty
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Gateway base URL, without the trailing `/chat/completions`
    pub base_url: String,
}

impl AdapterConfig {
    /// Create a config against the default endpoint
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the gateway endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the API key and base URL from the process environment
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        Self::from_lookup(model, env_var)
    }

    /// Read the API key and base URL through `lookup`
    ///
    /// A missing key yields an empty `api_key`; it is rejected when the
    /// generator is constructed, not here.
    #[must_use]
    pub fn from_lookup(model: impl Into<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::new(lookup(API_KEY_ENV).unwrap_or_default(), model);
        match non_empty(lookup(BASE_URL_ENV)) {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        }
    }

    /// Resolve a config from overrides, settings and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if no model is named anywhere.
    pub fn resolve(overrides: &ConfigOverrides, settings: &Settings) -> Result<Self> {
        let model = Self::resolve_model(overrides, settings)?;
        Ok(Self::from_env(model).with_layered_base_url(overrides, settings))
    }

    /// Like [`AdapterConfig::resolve`], reading the environment through `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if no model is named anywhere.
    pub fn resolve_with(
        overrides: &ConfigOverrides,
        settings: &Settings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let model = Self::resolve_model(overrides, settings)?;
        Ok(Self::from_lookup(model, lookup).with_layered_base_url(overrides, settings))
    }

    fn resolve_model(overrides: &ConfigOverrides, settings: &Settings) -> Result<String> {
        non_empty(overrides.model.clone())
            .or_else(|| non_empty(settings.model.clone()))
            .ok_or_else(|| {
                AdapterError::InvalidConfig(format!(
                    "no model configured; pass --model or set {MODEL_ENV}"
                ))
            })
    }

    /// An override wins over the environment, which wins over settings
    fn with_layered_base_url(self, overrides: &ConfigOverrides, settings: &Settings) -> Self {
        if let Some(base_url) = non_empty(overrides.base_url.clone()) {
            return self.with_base_url(base_url);
        }
        match non_empty(settings.base_url.clone()) {
            Some(base_url) if self.base_url == DEFAULT_BASE_URL => self.with_base_url(base_url),
            _ => self,
        }
    }

    /// Endpoint URL for `path` under the base URL
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Get the settings directory path
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("portkey-adapter")
    }

    /// Get the settings file path
    #[must_use]
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Values supplied on the command line
///
/// The CLI fills these from flags or, failing that, from `PORTKEY_MODEL`
/// and `PORTKEY_BASE_URL`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Look up an environment variable, treating invalid unicode as unset
#[must_use]
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_base_url() {
        let config = AdapterConfig::new("key", "model");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.endpoint("chat/completions"),
            "https://api.portkey.ai/v1/chat/completions"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = AdapterConfig::new("key", "model").with_base_url("http://localhost:8787/v1/");
        assert_eq!(config.endpoint("embeddings"), "http://localhost:8787/v1/embeddings");
    }

    #[test]
    fn test_from_lookup() {
        let config = AdapterConfig::from_lookup(
            "gpt-4o",
            lookup(&[(API_KEY_ENV, "pk-123"), (BASE_URL_ENV, "http://gw/v1")]),
        );
        assert_eq!(config.api_key, "pk-123");
        assert_eq!(config.base_url, "http://gw/v1");
        assert_eq!(config.model, "gpt-4o");

        let config = AdapterConfig::from_lookup("m", lookup(&[(BASE_URL_ENV, "")]));
        assert!(config.api_key.is_empty());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_precedence() {
        let settings = Settings {
            model: Some("from-settings".to_string()),
            base_url: Some("http://settings/v1".to_string()),
            ..Settings::default()
        };

        let config =
            AdapterConfig::resolve_with(&ConfigOverrides::default(), &settings, lookup(&[(API_KEY_ENV, "pk")]))
                .unwrap();
        assert_eq!(config.api_key, "pk");
        assert_eq!(config.model, "from-settings");
        assert_eq!(config.base_url, "http://settings/v1");

        let config = AdapterConfig::resolve_with(
            &ConfigOverrides::default(),
            &settings,
            lookup(&[(BASE_URL_ENV, "http://env/v1")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://env/v1");

        let overrides = ConfigOverrides {
            model: Some("from-flag".to_string()),
            base_url: Some("http://flag/v1".to_string()),
        };
        let config =
            AdapterConfig::resolve_with(&overrides, &settings, lookup(&[(BASE_URL_ENV, "http://env/v1")]))
                .unwrap();
        assert_eq!(config.model, "from-flag");
        assert_eq!(config.base_url, "http://flag/v1");
    }

    #[test]
    fn test_resolve_requires_model() {
        let err =
            AdapterConfig::resolve_with(&ConfigOverrides::default(), &Settings::default(), lookup(&[]))
                .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", AdapterConfig::new("secret-key", "m"));
        assert!(!rendered.contains("secret-key"));
    }
}

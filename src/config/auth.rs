//! Auth method selection and environment checks
//!
//! Runs before any generator is built: given the selected auth method it
//! checks that the environment carries the credentials that method needs.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::env_var;

/// Supported auth methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "oauth-personal")]
    LoginWithGooglePersonal,
    #[serde(rename = "gemini-api-key")]
    UseGemini,
    #[serde(rename = "vertex-ai")]
    UseVertexAi,
    #[serde(rename = "portkey")]
    UsePortkey,
}

impl AuthType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoginWithGooglePersonal => "oauth-personal",
            Self::UseGemini => "gemini-api-key",
            Self::UseVertexAi => "vertex-ai",
            Self::UsePortkey => "portkey",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oauth-personal" => Ok(Self::LoginWithGooglePersonal),
            "gemini-api-key" => Ok(Self::UseGemini),
            "vertex-ai" => Ok(Self::UseVertexAi),
            "portkey" => Ok(Self::UsePortkey),
            _ => Err(format!("Invalid auth method: {s}")),
        }
    }
}

/// Load `.env` from the current directory or one of its parents
pub fn load_environment() {
    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) => debug!(error = %e, "no environment file loaded"),
    }
}

/// Check the environment for `auth_method`
///
/// Loads `.env` first. Returns `None` when the method is usable, otherwise a
/// message telling the user what to set.
#[must_use]
pub fn validate_auth_method(auth_method: &str) -> Option<String> {
    load_environment();
    validate_auth_method_with(auth_method, env_var)
}

/// Check `auth_method` against variables read through `lookup`
#[must_use]
pub fn validate_auth_method_with(
    auth_method: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let has = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

    let Ok(auth_type) = auth_method.parse::<AuthType>() else {
        return Some("Invalid auth method selected.".to_string());
    };

    match auth_type {
        AuthType::LoginWithGooglePersonal => None,
        AuthType::UseGemini => (!has("GEMINI_API_KEY")).then(|| {
            "GEMINI_API_KEY environment variable not found. Add that to your .env and try again, no reload needed!"
                .to_string()
        }),
        AuthType::UseVertexAi => {
            let has_project_location = has("GOOGLE_CLOUD_PROJECT") && has("GOOGLE_CLOUD_LOCATION");
            if has_project_location || has("GOOGLE_API_KEY") {
                None
            } else {
                Some(
                    "Must specify GOOGLE_GENAI_USE_VERTEXAI=true and either:\n\
                     • GOOGLE_CLOUD_PROJECT and GOOGLE_CLOUD_LOCATION environment variables.\n\
                     • GOOGLE_API_KEY environment variable (if using express mode).\n\
                     Update your .env and try again, no reload needed!"
                        .to_string(),
                )
            }
        }
        AuthType::UsePortkey => {
            if !has("PORTKEY_API_KEY") {
                Some(
                    "PORTKEY_API_KEY environment variable not found.\n\
                     Also need GEMINI_API_KEY (or PORTKEY_VERTEX_ACCESS_TOKEN) for Vertex AI access.\n\
                     Optional: PORTKEY_VERTEX_PROJECT_ID, PORTKEY_VERTEX_REGION, PORTKEY_BASE_URL.\n\
                     Add these to your .env and try again, no reload needed!"
                        .to_string(),
                )
            } else if !has("GEMINI_API_KEY") && !has("PORTKEY_VERTEX_ACCESS_TOKEN") {
                Some(
                    "GEMINI_API_KEY or PORTKEY_VERTEX_ACCESS_TOKEN environment variable not found.\n\
                     Portkey needs a Gemini API key to access Vertex AI.\n\
                     Add this to your .env and try again, no reload needed!"
                        .to_string(),
                )
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_auth_type_round_trip_names() {
        for auth in [
            AuthType::LoginWithGooglePersonal,
            AuthType::UseGemini,
            AuthType::UseVertexAi,
            AuthType::UsePortkey,
        ] {
            assert_eq!(auth.as_str().parse::<AuthType>().unwrap(), auth);
        }
        assert!("api-key".parse::<AuthType>().is_err());
    }

    #[test]
    fn test_personal_login_always_valid() {
        assert_eq!(validate_auth_method_with("oauth-personal", env(&[])), None);
    }

    #[test]
    fn test_gemini_requires_key() {
        let message = validate_auth_method_with("gemini-api-key", env(&[])).unwrap();
        assert!(message.starts_with("GEMINI_API_KEY environment variable not found"));
        assert_eq!(
            validate_auth_method_with("gemini-api-key", env(&[("GEMINI_API_KEY", "g")])),
            None
        );
    }

    #[test]
    fn test_vertex_needs_project_and_location_or_key() {
        assert!(validate_auth_method_with("vertex-ai", env(&[("GOOGLE_CLOUD_PROJECT", "p")])).is_some());
        assert_eq!(
            validate_auth_method_with(
                "vertex-ai",
                env(&[("GOOGLE_CLOUD_PROJECT", "p"), ("GOOGLE_CLOUD_LOCATION", "us")])
            ),
            None
        );
        assert_eq!(
            validate_auth_method_with("vertex-ai", env(&[("GOOGLE_API_KEY", "k")])),
            None
        );
    }

    #[test]
    fn test_portkey_checks_both_keys() {
        let message = validate_auth_method_with("portkey", env(&[("GEMINI_API_KEY", "g")])).unwrap();
        assert!(message.starts_with("PORTKEY_API_KEY environment variable not found."));

        let message = validate_auth_method_with("portkey", env(&[("PORTKEY_API_KEY", "p")])).unwrap();
        assert!(message.starts_with("GEMINI_API_KEY or PORTKEY_VERTEX_ACCESS_TOKEN"));

        assert_eq!(
            validate_auth_method_with(
                "portkey",
                env(&[("PORTKEY_API_KEY", "p"), ("PORTKEY_VERTEX_ACCESS_TOKEN", "t")])
            ),
            None
        );
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        assert!(validate_auth_method_with("gemini-api-key", env(&[("GEMINI_API_KEY", "")])).is_some());
    }

    #[test]
    fn test_unknown_method() {
        assert_eq!(
            validate_auth_method_with("bogus", env(&[])).as_deref(),
            Some("Invalid auth method selected.")
        );
    }
}

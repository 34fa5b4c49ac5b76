//! Content types accepted by the adapter and their normalization
//!
//! Callers describe a conversation in the Gemini `contents` shape: a bare
//! string, a single structured [`Content`], or a list mixing both. Everything
//! the gateway needs is the flattened, role-tagged text produced by
//! [`normalize`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role of a normalized message as the gateway understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a Gemini content role onto a gateway role.
    ///
    /// Only `model` is an assistant turn; every other value, including a
    /// missing role, is treated as the user.
    #[must_use]
    pub fn from_content_role(role: Option<&str>) -> Self {
        match role {
            Some("model") => Self::Assistant,
            _ => Self::User,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One part of a structured content object
///
/// Only text parts are carried to the gateway. Other part kinds (inline data,
/// function calls) and non-string `text` values deserialize with
/// `text: None` and are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// A structured content object with a role and a list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient_parts")]
    pub parts: Vec<Part>,
}

/// Keep a string value; any other JSON value reads as absent
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Read each part on its own so one odd entry cannot reject its siblings
fn lenient_parts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Part>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| Part {
            text: match value {
                Value::Object(mut fields) => match fields.remove("text") {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                },
                _ => None,
            },
        })
        .collect())
}

impl Content {
    /// Create a user turn with a single text part
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model turn with a single text part
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// One element of a `contents` value
///
/// The variants mirror the shapes the Gemini SDK accepts. Deserialization
/// tries them in declaration order, so an object carrying `parts` is always
/// [`ContentInput::Parts`] even if it also has a `text` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentInput {
    /// A bare string, sent as a user turn
    RawString(String),

    /// A structured object with role and parts
    Parts(Content),

    /// An object carrying text directly, without parts
    TextOnly { text: String },

    /// Any other JSON shape; never produces a message
    Unsupported(Value),
}

impl ContentInput {
    /// Append the messages this element contributes, in order
    fn push_messages(&self, out: &mut Vec<NormalizedMessage>) {
        match self {
            Self::RawString(text) | Self::TextOnly { text } => {
                if !text.is_empty() {
                    out.push(NormalizedMessage::new(Role::User, text.clone()));
                }
            }
            Self::Parts(content) => {
                let role = Role::from_content_role(content.role.as_deref());
                out.extend(
                    content
                        .parts
                        .iter()
                        .filter_map(|part| part.text.as_deref())
                        .filter(|text| !text.is_empty())
                        .map(|text| NormalizedMessage::new(role, text)),
                );
            }
            Self::Unsupported(_) => {}
        }
    }
}

impl From<&str> for ContentInput {
    fn from(s: &str) -> Self {
        Self::RawString(s.to_string())
    }
}

impl From<String> for ContentInput {
    fn from(s: String) -> Self {
        Self::RawString(s)
    }
}

impl From<Content> for ContentInput {
    fn from(content: Content) -> Self {
        Self::Parts(content)
    }
}

/// The `contents` of a request: either one element or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Many(Vec<ContentInput>),
    One(ContentInput),
}

impl Contents {
    /// Iterate over the elements regardless of which shape was supplied
    pub fn iter(&self) -> std::slice::Iter<'_, ContentInput> {
        match self {
            Self::Many(items) => items.iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
        }
    }
}

impl Default for Contents {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<&str> for Contents {
    fn from(s: &str) -> Self {
        Self::One(s.into())
    }
}

impl From<String> for Contents {
    fn from(s: String) -> Self {
        Self::One(s.into())
    }
}

impl From<Content> for Contents {
    fn from(content: Content) -> Self {
        Self::One(content.into())
    }
}

impl From<Vec<ContentInput>> for Contents {
    fn from(items: Vec<ContentInput>) -> Self {
        Self::Many(items)
    }
}

impl From<Vec<Content>> for Contents {
    fn from(items: Vec<Content>) -> Self {
        Self::Many(items.into_iter().map(ContentInput::from).collect())
    }
}

/// A role-tagged text message ready for the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub role: Role,
    pub text: String,
}

impl NormalizedMessage {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Flatten `contents` into ordered role-tagged messages.
///
/// Elements and parts without text are dropped, so the result can be shorter
/// than the number of parts in the input. Never fails.
#[must_use]
pub fn normalize(contents: &Contents) -> Vec<NormalizedMessage> {
    let mut messages = Vec::new();
    for item in contents.iter() {
        item.push_messages(&mut messages);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_string_and_model_parts() {
        let contents = Contents::Many(vec!["hi".into(), Content::model("yo").into()]);

        assert_eq!(
            normalize(&contents),
            vec![
                NormalizedMessage::new(Role::User, "hi"),
                NormalizedMessage::new(Role::Assistant, "yo"),
            ]
        );
    }

    #[test]
    fn test_normalize_bare_string() {
        let messages = normalize(&"hello".into());
        assert_eq!(messages, vec![NormalizedMessage::new(Role::User, "hello")]);
    }

    #[test]
    fn test_parts_without_text_are_skipped() {
        let content = Content {
            role: Some("model".to_string()),
            parts: vec![
                Part::text("first"),
                Part::default(),
                Part::text(""),
                Part::text("second"),
            ],
        };

        let messages = normalize(&content.into());
        assert_eq!(
            messages,
            vec![
                NormalizedMessage::new(Role::Assistant, "first"),
                NormalizedMessage::new(Role::Assistant, "second"),
            ]
        );
    }

    #[test]
    fn test_unknown_roles_become_user() {
        let contents: Contents = vec![
            Content {
                role: Some("system".to_string()),
                parts: vec![Part::text("a")],
            },
            Content {
                role: None,
                parts: vec![Part::text("b")],
            },
        ]
        .into();

        let roles: Vec<Role> = normalize(&contents).into_iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User]);
    }

    #[test]
    fn test_deserialize_mixed_json_shapes() {
        let contents: Contents = serde_json::from_value(serde_json::json!([
            "plain",
            {"role": "model", "parts": [{"text": "reply"}, {"inlineData": {"mimeType": "image/png"}}]},
            {"text": "direct"},
            {"text": ""},
            42,
            {"unexpected": true}
        ]))
        .unwrap();

        assert_eq!(
            normalize(&contents),
            vec![
                NormalizedMessage::new(Role::User, "plain"),
                NormalizedMessage::new(Role::Assistant, "reply"),
                NormalizedMessage::new(Role::User, "direct"),
            ]
        );
    }

    #[test]
    fn test_malformed_fields_keep_sibling_parts() {
        let contents: Contents = serde_json::from_value(serde_json::json!([
            {"role": "model", "parts": [{"text": "keep me"}, {"text": 5}, "loose", null]},
            {"role": 7, "parts": [{"text": "also keep"}]}
        ]))
        .unwrap();

        assert_eq!(
            normalize(&contents),
            vec![
                NormalizedMessage::new(Role::Assistant, "keep me"),
                NormalizedMessage::new(Role::User, "also keep"),
            ]
        );
    }

    #[test]
    fn test_deserialize_single_object() {
        let contents: Contents =
            serde_json::from_value(serde_json::json!({"role": "user", "parts": [{"text": "one"}]}))
                .unwrap();
        assert!(matches!(contents, Contents::One(ContentInput::Parts(_))));
        assert_eq!(normalize(&contents).len(), 1);
    }

    #[test]
    fn test_empty_contents() {
        assert!(normalize(&Contents::default()).is_empty());
        assert!(normalize(&"".into()).is_empty());
    }
}

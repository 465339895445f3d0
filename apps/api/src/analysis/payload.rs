//! Generative-model response envelope, as returned by the provider and relayed by the backend.
//!
//! Every level is optional. Lists, content and text fields that arrive with the wrong JSON
//! type are read as absent rather than failing the whole payload, so the normalizer can
//! report which level was missing. Only the first item of each list is ever read; malformed
//! items after it are replaced with empty defaults.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `{ candidates: [ { content: { parts: [ { text } ] } } ] }` or `{ error }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysisPayload {
    #[serde(default, deserialize_with = "lenient_list")]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, deserialize_with = "lenient_message")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "lenient_content")]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default, deserialize_with = "lenient_list")]
    pub parts: Option<Vec<ContentPart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<String>,
}

impl RawAnalysisPayload {
    /// Payload carrying a single text part. Mostly useful for callers that already hold the text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![ContentPart {
                        text: Some(text.into()),
                    }]),
                }),
            }]),
            error: None,
        }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            candidates: None,
            error: Some(message.into()),
        }
    }
}

/// A JSON array becomes `Some(items)`; any other JSON type (or null) becomes `None`.
/// See [`lenient_item`] for how each element is read.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| lenient_item(index, item))
            .collect::<Result<Vec<T>, _>>()
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// A null first item makes the payload unreadable. Any other non-object item, and any
/// malformed item past the first, reads as an empty default.
fn lenient_item<T>(index: usize, item: Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match item {
        Value::Null if index == 0 => Err(serde_json::Error::custom(
            "invalid type: null, expected an object",
        )),
        Value::Object(_) if index == 0 => serde_json::from_value(item),
        Value::Object(_) => Ok(serde_json::from_value(item).unwrap_or_default()),
        _ => Ok(T::default()),
    }
}

/// `null` or a missing field is no content. A non-object value is content without parts.
fn lenient_content<'de, D>(deserializer: D) -> Result<Option<CandidateContent>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
        Some(_) => Ok(Some(CandidateContent::default())),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

/// Error messages are relayed verbatim; structured errors are rendered as their JSON text.
fn lenient_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(message)) => Some(message),
        Some(other) => Some(other.to_string()),
    })
}

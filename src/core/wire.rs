use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::models::PageMeta;

/// The `{success, message, code}` part of every envelope, success or not.
///
/// Decoded on its own so a failure body never has to match the payload type.
#[derive(Deserialize, Default)]
pub(crate) struct Header {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) code: Option<String>,
}

/// The `{data, meta}` part, read only once `success` is true.
#[derive(Deserialize)]
pub(crate) struct Payload<T> {
    pub(crate) data: Option<T>,
    pub(crate) meta: Option<PageMeta>,
}

/// Accepts strings as-is and renders any other JSON value (`429`, `true`) as text.
fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

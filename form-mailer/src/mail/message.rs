//! Contact form submission as posted by the browser.

use serde::Deserialize;
use serde_json::Value;

/// A decoded contact form submission.
///
/// Only structural decoding happens here: absent fields become empty strings
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactMessage {
    /// Sender's display name, used as the email subject
    #[serde(default)]
    pub name: String,
    /// Sender's reply address
    #[serde(default)]
    pub email: String,
    /// Free-form message body
    #[serde(default)]
    pub message: String,
    /// Hidden form field only bots fill in
    #[serde(default)]
    pub honeypot: String,
}

impl ContactMessage {
    /// Decode a JSON request body.
    ///
    /// Only a JSON object is accepted; serde would otherwise fill the struct
    /// positionally from an array.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice(body)? {
            Value::Object(fields) => serde_json::from_value(Value::Object(fields)),
            other => Err(serde::de::Error::invalid_type(
                unexpected(&other),
                &"a JSON object",
            )),
        }
    }

    /// Whether the honeypot field was filled in.
    pub fn is_spam(&self) -> bool {
        !self.honeypot.is_empty()
    }
}

fn unexpected(value: &Value) -> serde::de::Unexpected<'_> {
    use serde::de::Unexpected;

    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

//! Rich-text description documents.
//!
//! The editor produces a JSON tree (`doc` → block nodes → inline text runs).
//! The authoring client passes it through untouched; the only thing it reads
//! is the flattened plain text used by the description length rule.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Serialized editor document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(Value);

impl Default for RichText {
    fn default() -> Self {
        Self(json!({ "type": "doc", "content": [] }))
    }
}

impl RichText {
    /// Wrap an already-parsed document tree
    #[must_use]
    pub const fn from_json(value: Value) -> Self {
        Self(value)
    }

    /// Parse the string form the backend stores
    ///
    /// Text that is not a JSON document is kept as a single paragraph, which
    /// is how legacy plain-text descriptions load into the editor.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) if value.is_object() => Self(value),
            _ => {
                tracing::debug!("Description is not an editor document; wrapping as paragraph");
                Self::paragraphs([raw])
            },
        }
    }

    /// Build a document with one paragraph per entry
    #[must_use]
    pub fn paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let content: Vec<Value> = paragraphs
            .into_iter()
            .map(|text| {
                json!({
                    "type": "paragraph",
                    "content": [{ "type": "text", "text": text.as_ref() }]
                })
            })
            .collect();
        Self(json!({ "type": "doc", "content": content }))
    }

    /// The document tree
    #[must_use]
    pub const fn as_json(&self) -> &Value {
        &self.0
    }

    /// String form sent to the backend
    #[must_use]
    pub fn serialize(&self) -> String {
        self.0.to_string()
    }

    /// Concatenated inline text of every top-level block, without separators
    #[must_use]
    pub fn plain_text(&self) -> String {
        let Some(blocks) = self.0.get("content").and_then(Value::as_array) else {
            return String::new();
        };
        blocks
            .iter()
            .filter_map(|block| block.get("content").and_then(Value::as_array))
            .flatten()
            .filter_map(|inline| inline.get("text").and_then(Value::as_str))
            .collect()
    }

    /// Character count of [`Self::plain_text`]
    #[must_use]
    pub fn plain_text_len(&self) -> usize {
        self.plain_text().chars().count()
    }
}

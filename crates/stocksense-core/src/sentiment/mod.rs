//! Sentiment classification fallback engine
//!
//! Turns a raw sentiment payload of unknown shape into either a structured
//! headline list (passed through untouched) or a category distribution derived
//! by a fixed, deterministic heuristic. The pipeline never fails.

mod classifier;
mod distribution;

pub use classifier::{SentimentReport, classify, classify_text};
pub use distribution::{SentimentCategory, SentimentDistribution};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

const NOT_AVAILABLE: &str = "N/A";

/// One headline-level record as produced by the backend
///
/// The entry is kept exactly as received, extra keys and odd field types
/// included. Fields are read on demand for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentItem(Value);

impl SentimentItem {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Text of `key`; non-string values render as their JSON text, null and
    /// missing keys as `None`
    pub fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    pub fn headline(&self) -> Option<Cow<'_, str>> {
        self.field("headline")
    }

    pub fn sentiment(&self) -> Option<Cow<'_, str>> {
        self.field("sentiment")
    }

    pub fn justification(&self) -> Option<Cow<'_, str>> {
        self.field("justification")
    }

    pub fn headline_or_na(&self) -> Cow<'_, str> {
        self.headline().unwrap_or(Cow::Borrowed(NOT_AVAILABLE))
    }

    pub fn sentiment_or_na(&self) -> Cow<'_, str> {
        self.sentiment().unwrap_or(Cow::Borrowed(NOT_AVAILABLE))
    }

    pub fn justification_or_na(&self) -> Cow<'_, str> {
        self.justification().unwrap_or(Cow::Borrowed(NOT_AVAILABLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_render_any_json_type() {
        let item = SentimentItem::new(json!({
            "headline": 42,
            "sentiment": "Positive",
            "justification": null,
            "score": 0.9
        }));

        assert_eq!(item.headline_or_na(), "42");
        assert_eq!(item.sentiment_or_na(), "Positive");
        assert_eq!(item.justification_or_na(), "N/A");
        assert_eq!(item.field("score").as_deref(), Some("0.9"));
    }

    #[test]
    fn test_non_object_entry_has_no_fields() {
        let item = SentimentItem::new(json!("just a headline"));
        assert!(item.headline().is_none());
        assert_eq!(item.sentiment_or_na(), "N/A");
    }

    #[test]
    fn test_serializes_verbatim() {
        let raw = json!({"headline": "H1", "score": 0.9, "tags": ["ai"]});
        let item = SentimentItem::new(raw.clone());
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }
}

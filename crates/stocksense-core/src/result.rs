//! Analysis result types

use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which the backend may nest the effective payload
const DATA_KEY: &str = "data";

/// Normalized backend payload
///
/// The backend sometimes wraps the result under a `data` key and sometimes
/// returns it bare. [`AnalysisPayload::from_body`] applies the one unwrap rule so
/// everything downstream sees a single shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisPayload(Value);

impl AnalysisPayload {
    /// Unwrap `body["data"]` when the body is an object holding that key,
    /// otherwise keep the whole body
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key(DATA_KEY) => {
                Self(map.remove(DATA_KEY).unwrap_or(Value::Null))
            }
            other => Self(other),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Summary text, from `summary` or else `analysis_summary`
    pub fn summary(&self) -> Option<&str> {
        ["summary", "analysis_summary"]
            .iter()
            .filter_map(|key| self.0.get(key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    /// Raw sentiment report, if any
    pub fn sentiment_report(&self) -> Option<&Value> {
        self.0.get("sentiment_report").filter(|v| !v.is_null())
    }
}

/// Outcome of one completed analysis job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: Ticker,
    pub data: AnalysisPayload,
    pub observed_at: DateTime<Utc>,
    pub succeeded: bool,
}

impl AnalysisResult {
    /// Build a successful result from a raw backend body
    pub fn from_body(ticker: Ticker, body: Value) -> Self {
        Self {
            ticker,
            data: AnalysisPayload::from_body(body),
            observed_at: Utc::now(),
            succeeded: true,
        }
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// One-line label used in history listings
    pub fn label(&self) -> String {
        format!("{} - {}", self.ticker, self.observed_at.format("%m/%d %H:%M"))
    }
}

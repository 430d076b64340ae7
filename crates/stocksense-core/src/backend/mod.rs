//! Analysis backend collaborator
//!
//! The backend exposes three endpoints: `GET /health`, `POST /analyze/{ticker}`
//! and `GET /results/{ticker}`. Implementations return the raw status and body;
//! interpreting them is the orchestrator's job. Transport failures are
//! reported as errors.

mod http;

pub use http::HttpBackend;

use crate::error::{Result, SenseError};
use crate::ticker::Ticker;
use async_trait::async_trait;
use serde_json::Value;

/// Raw HTTP response from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body parsed as JSON; anything else is a malformed response
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| SenseError::MalformedResponse {
            status: self.status,
            reason: e.to_string(),
        })
    }

    /// Body parsed as JSON, or kept as a JSON string when it is not JSON
    pub fn json_or_text(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

/// Transport to the analysis backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Liveness probe
    async fn health(&self) -> Result<BackendResponse>;

    /// Start an analysis job
    async fn trigger(&self, ticker: &Ticker) -> Result<BackendResponse>;

    /// Check for a finished result
    async fn fetch_results(&self, ticker: &Ticker) -> Result<BackendResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_json() {
        let response = BackendResponse::new(200, r#"{"status":"ok"}"#);
        assert!(response.is_ok());
        assert_eq!(response.json().unwrap(), json!({"status": "ok"}));
    }

    #[test]
    fn test_response_json_or_text() {
        let response = BackendResponse::new(200, "accepted");
        assert!(matches!(
            response.json(),
            Err(SenseError::MalformedResponse { status: 200, .. })
        ));
        assert_eq!(response.json_or_text(), json!("accepted"));
    }
}

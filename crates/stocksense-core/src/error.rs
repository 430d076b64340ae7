//! Error types for analysis operations

use crate::ticker::TickerError;
use thiserror::Error;

/// Errors surfaced by the analysis client
#[derive(Debug, Error)]
pub enum SenseError {
    /// Network or transport failure on any backend call
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Backend answered with a body that could not be read as JSON
    #[error("Malformed response (status {status}): {reason}")]
    MalformedResponse {
        status: u16,
        reason: String,
    },

    /// Backend answered with an unexpected status
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        status: u16,
        body: String,
    },

    /// Polling exhausted its attempt budget while the job was still pending
    #[error("Results for {ticker} not ready after {attempts} attempts")]
    NotReadyTimeout {
        ticker: String,
        attempts: u32,
    },

    /// The trigger request itself exceeded its timeout
    #[error("Trigger request timed out: {0}")]
    TriggerTimedOut(String),

    /// Health probe reported the backend offline
    #[error("Backend is offline")]
    BackendOffline,

    /// Ticker failed syntactic validation
    #[error("Invalid ticker: {0}")]
    Validation(#[from] TickerError),

    /// Caller cancelled the job
    #[error("Analysis cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Price history provider error
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SenseError {
    /// Whether the failure means "too slow" rather than "rejected"
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SenseError::NotReadyTimeout { .. } | SenseError::TriggerTimedOut(_)
        )
    }

    /// Whether the backend rejected or failed the request
    pub fn is_hard_error(&self) -> bool {
        matches!(
            self,
            SenseError::Connectivity(_)
                | SenseError::HttpStatus { .. }
                | SenseError::MalformedResponse { .. }
                | SenseError::BackendOffline
        )
    }

    /// Single user-facing message per failure category
    pub fn user_message(&self) -> String {
        match self {
            SenseError::Connectivity(_) => {
                "Cannot connect to backend. Please ensure the server is running.".to_string()
            }
            SenseError::HttpStatus { status, body } if body.is_empty() => {
                format!("Analysis failed: Status {status}")
            }
            SenseError::HttpStatus { status, body } => {
                format!("Analysis failed: Status {status}\nDetails: {body}")
            }
            SenseError::MalformedResponse { status, .. } => {
                format!("Analysis failed: Status {status}\nDetails: backend returned an unreadable result")
            }
            SenseError::NotReadyTimeout { .. } => "Analysis timed out. Please try again.".to_string(),
            SenseError::TriggerTimedOut(_) => {
                "Request timed out. Analysis may still be processing.".to_string()
            }
            SenseError::BackendOffline => {
                "Backend server is offline. Please start the analysis server.".to_string()
            }
            SenseError::Validation(reason) => reason.to_string(),
            SenseError::Cancelled => "Analysis cancelled.".to_string(),
            other => format!("Unexpected error: {other}"),
        }
    }
}

impl From<reqwest::Error> for SenseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SenseError::Connectivity(format!("request timed out: {err}"))
        } else {
            SenseError::Connectivity(err.to_string())
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, SenseError>;

//! Sentiment insight for the most recent persisted analysis
//!
//! Reads the backend's stored result for a ticker and runs the classifier on
//! its sentiment report. Missing data and repository failures both degrade to
//! [`SentimentInsight::Unavailable`].

use crate::backend::{AnalysisBackend, BackendResponse, HttpBackend};
use crate::error::{Result, SenseError};
use crate::result::AnalysisPayload;
use crate::retry::{NOT_READY_STATUS, READY_STATUS};
use crate::sentiment::{SentimentReport, classify};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Latest stored analysis for a ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedAnalysis {
    pub ticker: Ticker,
    pub data: AnalysisPayload,
    pub retrieved_at: DateTime<Utc>,
}

impl PersistedAnalysis {
    fn from_response(ticker: &Ticker, response: BackendResponse) -> Result<Option<Self>> {
        match response.status {
            READY_STATUS => Ok(Some(Self {
                ticker: ticker.clone(),
                data: AnalysisPayload::from_body(response.json()?),
                retrieved_at: Utc::now(),
            })),
            NOT_READY_STATUS => Ok(None),
            status => Err(SenseError::HttpStatus {
                status,
                body: response.body,
            }),
        }
    }
}

/// Read access to stored analyses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    async fn latest_analysis(&self, ticker: &Ticker) -> Result<Option<PersistedAnalysis>>;
}

#[async_trait]
impl AnalysisRepository for HttpBackend {
    async fn latest_analysis(&self, ticker: &Ticker) -> Result<Option<PersistedAnalysis>> {
        let response = self.fetch_results(ticker).await?;
        PersistedAnalysis::from_response(ticker, response)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentInsight {
    Available {
        ticker: Ticker,
        report: SentimentReport,
    },
    Unavailable {
        ticker: Ticker,
        reason: String,
    },
}

impl SentimentInsight {
    pub fn report(&self) -> Option<&SentimentReport> {
        match self {
            SentimentInsight::Available { report, .. } => Some(report),
            SentimentInsight::Unavailable { .. } => None,
        }
    }

    fn unavailable(ticker: &Ticker, reason: impl Into<String>) -> Self {
        SentimentInsight::Unavailable {
            ticker: ticker.clone(),
            reason: reason.into(),
        }
    }
}

/// Classify the sentiment report of the latest stored analysis
pub async fn sentiment_insight(repo: &dyn AnalysisRepository, ticker: &Ticker) -> SentimentInsight {
    let analysis = match repo.latest_analysis(ticker).await {
        Ok(Some(analysis)) => analysis,
        Ok(None) => return SentimentInsight::unavailable(ticker, "No analysis stored yet"),
        Err(e) => {
            warn!("Could not load latest analysis for {}: {}", ticker, e);
            return SentimentInsight::unavailable(ticker, e.user_message());
        }
    };

    match analysis.data.sentiment_report() {
        Some(raw) => SentimentInsight::Available {
            ticker: ticker.clone(),
            report: classify(raw),
        },
        None => SentimentInsight::unavailable(ticker, "No sentiment report in latest analysis"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentCategory;
    use serde_json::json;

    fn ticker() -> Ticker {
        Ticker::parse("NVDA").unwrap()
    }

    fn persisted(data: serde_json::Value) -> PersistedAnalysis {
        PersistedAnalysis {
            ticker: ticker(),
            data: AnalysisPayload::from_body(data),
            retrieved_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_response_statuses() {
        let ready = BackendResponse::new(200, json!({"data": {"summary": "ok"}}).to_string());
        let found = PersistedAnalysis::from_response(&ticker(), ready).unwrap().unwrap();
        assert_eq!(found.data.summary(), Some("ok"));

        let missing = BackendResponse::new(404, "{\"detail\":\"not found\"}");
        assert!(PersistedAnalysis::from_response(&ticker(), missing).unwrap().is_none());

        let unreadable = BackendResponse::new(200, "not json");
        let err = PersistedAnalysis::from_response(&ticker(), unreadable).unwrap_err();
        assert!(matches!(err, SenseError::MalformedResponse { status: 200, .. }));

        let broken = BackendResponse::new(502, "bad gateway");
        let err = PersistedAnalysis::from_response(&ticker(), broken).unwrap_err();
        assert!(matches!(err, SenseError::HttpStatus { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_classifies_text_report() {
        let mut repo = MockAnalysisRepository::new();
        repo.expect_latest_analysis().returning(|_| {
            Ok(Some(persisted(json!({"sentiment_report": "Overall sentiment: positive"}))))
        });

        let insight = sentiment_insight(&repo, &ticker()).await;
        let dist = insight.report().and_then(SentimentReport::distribution).unwrap();
        assert_eq!(dist.get(SentimentCategory::Positive), 1);
        assert_eq!(dist.dominant(), SentimentCategory::Positive);
    }

    #[tokio::test]
    async fn test_structured_report_passes_through() {
        let mut repo = MockAnalysisRepository::new();
        repo.expect_latest_analysis().returning(|_| {
            Ok(Some(persisted(json!({
                "sentiment_report": [{"headline": "Chips rally", "sentiment": "Positive"}]
            }))))
        });

        let insight = sentiment_insight(&repo, &ticker()).await;
        let items = insight.report().and_then(SentimentReport::items).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline_or_na(), "Chips rally");
    }

    #[tokio::test]
    async fn test_missing_report_is_unavailable() {
        let mut repo = MockAnalysisRepository::new();
        repo.expect_latest_analysis()
            .returning(|_| Ok(Some(persisted(json!({"summary": "no sentiment here"})))));

        let insight = sentiment_insight(&repo, &ticker()).await;
        assert!(matches!(insight, SentimentInsight::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_nothing_stored_is_unavailable() {
        let mut repo = MockAnalysisRepository::new();
        repo.expect_latest_analysis().returning(|_| Ok(None));

        assert!(sentiment_insight(&repo, &ticker()).await.report().is_none());
    }

    #[tokio::test]
    async fn test_repository_error_degrades() {
        let mut repo = MockAnalysisRepository::new();
        repo.expect_latest_analysis()
            .returning(|_| Err(SenseError::Connectivity("refused".to_string())));

        match sentiment_insight(&repo, &ticker()).await {
            SentimentInsight::Unavailable { reason, .. } => {
                assert!(reason.starts_with("Cannot connect to backend"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }
}

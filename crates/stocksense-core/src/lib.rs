//! Client core for the StockSense analysis backend
//!
//! This crate submits a ticker to a remote analysis backend and turns what the
//! backend eventually returns into display-ready data:
//!
//! - Ticker normalization and validation
//! - Trigger-then-poll job orchestration with a bounded fixed-delay policy
//! - A deterministic sentiment classifier for structured or free-text reports
//! - Bounded most-recent-first result history held in an explicit [`Session`]
//! - Price history and key metrics for display
//!
//! # Example
//!
//! ```rust,ignore
//! use stocksense_core::{ClientConfig, JobOrchestrator, Session, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::builder().from_env()?.build()?;
//!     let orchestrator = JobOrchestrator::from_config(&config)?;
//!     let mut session = Session::new();
//!
//!     let ticker = Ticker::parse(" aapl ")?;
//!     let result = orchestrator.run(&mut session, &ticker).await?;
//!     println!("{}", result.data.summary().unwrap_or("No summary available"));
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod insights;
pub mod market;
pub mod orchestrator;
pub mod result;
pub mod retry;
pub mod sentiment;
pub mod session;
pub mod store;
pub mod ticker;

// Re-export main types for convenience
pub use backend::{AnalysisBackend, BackendResponse, HttpBackend};
pub use config::ClientConfig;
pub use error::{Result, SenseError};
pub use insights::{AnalysisRepository, PersistedAnalysis, SentimentInsight, sentiment_insight};
pub use market::{
    CachedPriceProvider, HistoryPeriod, PriceHistoryProvider, PriceMetrics, PricePoint,
    YahooPriceProvider,
};
pub use orchestrator::{AnalysisJob, JobEvent, JobOrchestrator, JobState, TriggerAck};
pub use result::{AnalysisPayload, AnalysisResult};
pub use retry::{CancelHandle, CancelToken, PollPolicy};
pub use sentiment::{
    SentimentCategory, SentimentDistribution, SentimentItem, SentimentReport, classify,
    classify_text,
};
pub use session::Session;
pub use store::ResultStore;
pub use ticker::{Ticker, TickerError};

//! Analysis job orchestration
//!
//! Drives one ticker's job against the backend: health probe, trigger, then a
//! bounded poll for the result. Successful results are written into the
//! caller's [`Session`].
//!
//! ```text
//! Idle -> Triggered -> Polling -> Succeeded | NotReadyTimeout | HardError
//! ```
//!
//! Every call starts a fresh sequence. Overlapping runs for the same ticker
//! are not deduplicated.

use crate::backend::{AnalysisBackend, HttpBackend};
use crate::config::ClientConfig;
use crate::error::{Result, SenseError};
use crate::result::AnalysisResult;
use crate::retry::{CancelToken, PollDecision, PollOutcome, PollPolicy, PollStep};
use crate::session::Session;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Lifecycle of one trigger + poll sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Idle,
    Triggered,
    Polling,
    Succeeded,
    NotReadyTimeout,
    HardError,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::NotReadyTimeout | JobState::HardError | JobState::Cancelled
        )
    }

    fn from_error(err: &SenseError) -> Self {
        match err {
            SenseError::NotReadyTimeout { .. } => JobState::NotReadyTimeout,
            SenseError::Cancelled => JobState::Cancelled,
            _ => JobState::HardError,
        }
    }
}

/// Progress notifications, advisory only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobEvent {
    State { ticker: Ticker, state: JobState },
    Attempt { ticker: Ticker, attempt: u32, total: u32 },
}

/// Ephemeral record of one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisJob {
    pub ticker: Ticker,
    pub triggered_at: DateTime<Utc>,
    pub state: JobState,
}

/// Backend acknowledgement of a trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerAck {
    pub job: AnalysisJob,
    pub body: Value,
}

/// Trigger-and-poll driver for backend analysis jobs
pub struct JobOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    events: Option<UnboundedSender<JobEvent>>,
    cancel: Option<CancelToken>,
}

impl JobOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: PollPolicy) -> Self {
        Self {
            backend,
            policy,
            events: None,
            cancel: None,
        }
    }

    /// Build an orchestrator over the HTTP backend described by `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.poll_policy))
    }

    /// Send state and attempt notifications to `tx`
    pub fn with_events(mut self, tx: UnboundedSender<JobEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Abort polling when `token` is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Probe `/health` and record the outcome in the session
    pub async fn check_health(&self, session: &mut Session) -> bool {
        let online = match self.backend.health().await {
            Ok(response) => response.is_ok(),
            Err(e) => {
                debug!("Health probe failed: {}", e);
                false
            }
        };

        session.set_backend_online(online);
        online
    }

    /// Start an analysis job; a non-200 answer is a hard failure and is not
    /// retried
    pub async fn trigger(&self, ticker: &Ticker) -> Result<TriggerAck> {
        let triggered_at = Utc::now();
        let response = self.backend.trigger(ticker).await.inspect_err(|e| {
            warn!("Trigger for {} failed: {}", ticker, e);
        })?;

        if !response.is_ok() {
            warn!("Trigger for {} rejected with status {}", ticker, response.status);
            return Err(SenseError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        info!("Analysis for {} triggered", ticker);
        self.emit_state(ticker, JobState::Triggered);

        Ok(TriggerAck {
            job: AnalysisJob {
                ticker: ticker.clone(),
                triggered_at,
                state: JobState::Triggered,
            },
            body: response.json_or_text(),
        })
    }

    /// Poll `/results/{ticker}` under the configured policy
    ///
    /// On success the result is recorded in the session history and becomes
    /// the current result. Timeouts and hard errors leave the session
    /// untouched.
    pub async fn poll_until_ready(&self, session: &mut Session, ticker: &Ticker) -> Result<AnalysisResult> {
        self.emit_state(ticker, JobState::Polling);

        let outcome = self
            .policy
            .execute(
                &format!("fetch results for {ticker}"),
                self.cancel.as_ref(),
                |attempt, total| {
                    self.emit(JobEvent::Attempt {
                        ticker: ticker.clone(),
                        attempt,
                        total,
                    });
                },
                |_| self.poll_once(ticker),
            )
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.emit_state(ticker, JobState::from_error(&e));
                return Err(e);
            }
        };

        match outcome {
            PollOutcome::Ready { value, attempts } => {
                let result = AnalysisResult::from_body(ticker.clone(), value);
                session.record_success(result.clone());
                info!("Results for {} retrieved after {} attempt(s)", ticker, attempts);
                self.emit_state(ticker, JobState::Succeeded);
                Ok(result)
            }
            PollOutcome::Exhausted { attempts } => {
                self.emit_state(ticker, JobState::NotReadyTimeout);
                Err(SenseError::NotReadyTimeout {
                    ticker: ticker.to_string(),
                    attempts,
                })
            }
        }
    }

    /// Full sequence: health probe, trigger, poll
    pub async fn run(&self, session: &mut Session, ticker: &Ticker) -> Result<AnalysisResult> {
        self.emit_state(ticker, JobState::Idle);

        if !self.check_health(session).await {
            warn!("Backend offline, not triggering analysis for {}", ticker);
            self.emit_state(ticker, JobState::HardError);
            return Err(SenseError::BackendOffline);
        }

        if let Err(e) = self.trigger(ticker).await {
            self.emit_state(ticker, JobState::HardError);
            return Err(e);
        }

        self.poll_until_ready(session, ticker).await
    }

    async fn poll_once(&self, ticker: &Ticker) -> Result<PollStep<Value>> {
        let response = self.backend.fetch_results(ticker).await?;

        match PollDecision::from_status(response.status) {
            PollDecision::Ready => Ok(PollStep::Ready(response.json()?)),
            PollDecision::Retry => Ok(PollStep::Pending),
            PollDecision::Terminal => Err(SenseError::HttpStatus {
                status: response.status,
                body: response.body,
            }),
        }
    }

    fn emit_state(&self, ticker: &Ticker, state: JobState) {
        self.emit(JobEvent::State {
            ticker: ticker.clone(),
            state,
        });
    }

    fn emit(&self, event: JobEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is rendering progress
            let _ = tx.send(event);
        }
    }
}

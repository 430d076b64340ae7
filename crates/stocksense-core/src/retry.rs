//! Fixed-delay polling with cancellation
//!
//! A [`PollPolicy`] runs an async operation up to `max_attempts` times. Each
//! attempt either yields a value, reports "not ready yet", or fails. Only the
//! not-ready branch is retried, after a fixed delay; failures are terminal.

use crate::error::{Result, SenseError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Status code the backend uses for "job exists but has no result yet"
pub const NOT_READY_STATUS: u16 = 404;

/// Status code for a ready result
pub const READY_STATUS: u16 = 200;

/// How a poll response status should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Ready,
    Retry,
    Terminal,
}

impl PollDecision {
    pub fn from_status(status: u16) -> Self {
        match status {
            READY_STATUS => PollDecision::Ready,
            NOT_READY_STATUS => PollDecision::Retry,
            _ => PollDecision::Terminal,
        }
    }
}

/// Result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    Ready(T),
    Pending,
}

/// Non-error outcome of a polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Poll policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Fixed delay between consecutive not-ready attempts
    pub delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Create a policy with fast retries (for testing)
    pub fn fast() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(1),
        }
    }

    /// Upper bound on time spent sleeping between attempts
    pub fn total_delay(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }

    /// Execute `operation` until it is ready, fails, runs out of attempts or
    /// is cancelled
    ///
    /// `on_attempt(attempt, total)` is called after every attempt that
    /// completed, whatever its result.
    pub async fn execute<F, Fut, T, P>(
        &self,
        operation_name: &str,
        cancel: Option<&CancelToken>,
        mut on_attempt: P,
        mut operation: F,
    ) -> Result<PollOutcome<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PollStep<T>>>,
        P: FnMut(u32, u32),
    {
        for attempt in 1..=self.max_attempts {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!("Operation '{}' cancelled before attempt {}", operation_name, attempt);
                return Err(SenseError::Cancelled);
            }

            debug!(
                "Attempt {}/{} for operation: {}",
                attempt, self.max_attempts, operation_name
            );

            let step = tokio::select! {
                biased;
                () = wait_cancelled(cancel) => {
                    debug!("Operation '{}' cancelled during attempt {}", operation_name, attempt);
                    return Err(SenseError::Cancelled);
                }
                step = operation(attempt) => step,
            };

            on_attempt(attempt, self.max_attempts);

            match step {
                Ok(PollStep::Ready(value)) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' ready after {} attempts",
                            operation_name, attempt
                        );
                    }
                    return Ok(PollOutcome::Ready {
                        value,
                        attempts: attempt,
                    });
                }
                Ok(PollStep::Pending) => {
                    if attempt < self.max_attempts {
                        debug!(
                            "Operation '{}' not ready (attempt {}/{}). Retrying in {:?}",
                            operation_name, attempt, self.max_attempts, self.delay
                        );
                        tokio::select! {
                            biased;
                            () = wait_cancelled(cancel) => {
                                debug!("Operation '{}' cancelled while waiting", operation_name);
                                return Err(SenseError::Cancelled);
                            }
                            () = sleep(self.delay) => {}
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Operation '{}' failed on attempt {}/{}: {}",
                        operation_name, attempt, self.max_attempts, e
                    );
                    return Err(e);
                }
            }
        }

        warn!(
            "Operation '{}' still not ready after {} attempts",
            operation_name, self.max_attempts
        );

        Ok(PollOutcome::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Sender side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Signal cancellation to every token cloned from this handle
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiver side of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is signalled; never resolves if the handle is
    /// dropped without cancelling
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

async fn wait_cancelled(cancel: Option<&CancelToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

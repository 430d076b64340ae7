//! Per-session analysis state

use crate::result::AnalysisResult;
use crate::store::ResultStore;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// State owned by one user session
///
/// Holds the currently displayed result, the bounded history and the last
/// known backend status. Passed explicitly into orchestrator operations;
/// separate sessions never share a store.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    current: Option<AnalysisResult>,
    history: ResultStore,
    backend_online: Option<bool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_history(ResultStore::new())
    }

    pub fn with_history(history: ResultStore) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            current: None,
            history,
            backend_online: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &ResultStore {
        &self.history
    }

    /// Last health probe outcome, `None` before the first probe
    pub fn backend_online(&self) -> Option<bool> {
        self.backend_online
    }

    pub fn set_backend_online(&mut self, online: bool) {
        self.backend_online = Some(online);
        self.touch();
    }

    pub fn set_current(&mut self, result: AnalysisResult) {
        self.current = Some(result);
        self.touch();
    }

    /// Record a finished analysis in history and make it the current result
    pub fn record_success(&mut self, result: AnalysisResult) {
        self.history.record(result.clone());
        self.set_current(result);
    }

    /// Re-display a past analysis; returns false when the index is out of range
    pub fn select_from_history(&mut self, index: usize) -> bool {
        match self.history.get(index).cloned() {
            Some(result) => {
                self.set_current(result);
                true
            }
            None => false,
        }
    }

    pub fn clear_current(&mut self) {
        self.current = None;
        self.touch();
    }

    /// Drop the current result and the whole history
    pub fn reset(&mut self) {
        self.current = None;
        self.history.clear();
        self.touch();
    }

    pub fn is_expired(&self, max_age_seconds: i64) -> bool {
        let max_age = chrono::Duration::seconds(max_age_seconds);
        Utc::now() - self.last_active > max_age
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

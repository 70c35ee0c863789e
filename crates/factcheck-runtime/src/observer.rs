//! Observability handle for a verifier.
//!
//! The pipeline reports stage timings, isolated failures and run outcomes to
//! an injected [`PipelineObserver`]. [`TracingObserver`] is the default and
//! emits `tracing` events; [`RecordingObserver`] keeps events in memory.
//! Installing a `tracing` subscriber stays with the binary.

use chrono::{DateTime, Utc};
use factcheck_core::ReportStatus;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::query::Stage;

/// A search that failed and was replaced by empty evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub query: String,
    pub backend: String,
    pub reason: String,
    pub at: DateTime<Utc>,
}

impl SearchFailure {
    pub fn new(
        query: impl Into<String>,
        backend: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            backend: backend.into(),
            reason: reason.into(),
            at: Utc::now(),
        }
    }
}

/// Receiver for pipeline events.
///
/// All methods but `search_failed` default to doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn stage_completed(&self, _stage: Stage, _elapsed: Duration) {}

    fn search_failed(&self, failure: &SearchFailure);

    fn assumption_failed(&self, _assumption: &str, _error: &str) {}

    fn run_finished(&self, _status: ReportStatus, _elapsed: Duration) {}
}

/// Emits every event as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        tracing::debug!(
            stage = %stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "Stage completed"
        );
    }

    fn search_failed(&self, failure: &SearchFailure) {
        tracing::warn!(
            query = %failure.query,
            backend = %failure.backend,
            reason = %failure.reason,
            "Search failed, continuing without evidence"
        );
    }

    fn assumption_failed(&self, assumption: &str, error: &str) {
        tracing::warn!(assumption, error, "Assumption verification failed");
    }

    fn run_finished(&self, status: ReportStatus, elapsed: Duration) {
        tracing::info!(
            status = ?status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Verification run finished"
        );
    }
}

/// An event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageCompleted(Stage),
    SearchFailed(SearchFailure),
    AssumptionFailed { assumption: String, error: String },
    RunFinished(ReportStatus),
}

/// Keeps events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    pub fn search_failures(&self) -> Vec<SearchFailure> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::SearchFailed(failure) => Some(failure.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl PipelineObserver for RecordingObserver {
    fn stage_completed(&self, stage: Stage, _elapsed: Duration) {
        self.events.lock().push(PipelineEvent::StageCompleted(stage));
    }

    fn search_failed(&self, failure: &SearchFailure) {
        self.events
            .lock()
            .push(PipelineEvent::SearchFailed(failure.clone()));
    }

    fn assumption_failed(&self, assumption: &str, error: &str) {
        self.events.lock().push(PipelineEvent::AssumptionFailed {
            assumption: assumption.to_string(),
            error: error.to_string(),
        });
    }

    fn run_finished(&self, status: ReportStatus, _elapsed: Duration) {
        self.events.lock().push(PipelineEvent::RunFinished(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.stage_completed(Stage::InitialResponse, Duration::ZERO);
        observer.search_failed(&SearchFailure::new("moon", "serpapi", "timeout"));
        observer.run_finished(ReportStatus::Success, Duration::ZERO);

        let events = observer.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], PipelineEvent::StageCompleted(Stage::InitialResponse));
        assert_eq!(events[2], PipelineEvent::RunFinished(ReportStatus::Success));

        let failures = observer.search_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].query, "moon");
        assert_eq!(failures[0].reason, "timeout");
    }

    #[test]
    fn test_clear() {
        let observer = RecordingObserver::new();
        observer.assumption_failed("A", "boom");
        observer.clear();
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_search_failure_serializes() {
        let failure = SearchFailure::new("q", "duckduckgo", "HTTP request failed");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["backend"], "duckduckgo");
        assert!(json["at"].is_string());
    }
}

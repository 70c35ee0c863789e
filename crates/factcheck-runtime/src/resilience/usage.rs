//! Model usage ledger.
//!
//! Counts model calls and tokens, in total and per pipeline stage.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::providers::TokenUsage;
use crate::query::Stage;

/// Accumulated model usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Number of model calls made
    pub llm_calls: u32,
}

impl LlmUsage {
    /// Add token usage from one provider response.
    pub fn add(&mut self, usage: &TokenUsage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total();
        self.llm_calls += 1;
    }
}

/// Snapshot of a [`UsageTracker`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub total: LlmUsage,
    pub by_stage: BTreeMap<Stage, LlmUsage>,
}

/// Thread-safe usage ledger shared by every model call of a verifier.
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: RwLock<UsageReport>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record usage after a call.
    pub fn record(&self, stage: Stage, usage: &TokenUsage) {
        let mut report = self.usage.write();
        report.total.add(usage);
        report.by_stage.entry(stage).or_default().add(usage);
    }

    pub fn report(&self) -> UsageReport {
        self.usage.read().clone()
    }

    /// Total usage across stages.
    pub fn total(&self) -> LlmUsage {
        self.usage.read().total
    }

    pub fn reset(&self) {
        *self.usage.write() = UsageReport::default();
    }
}

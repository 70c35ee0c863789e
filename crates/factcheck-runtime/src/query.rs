//! Single prompt in, text out.
//!
//! [`ModelClient`] is the only path from the pipeline to a model. It wraps
//! the prompt in one user message, records usage for the calling stage and
//! logs latency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};
use crate::resilience::UsageTracker;

/// Pipeline step that issued a model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InitialResponse,
    Extraction,
    Verification,
    Synthesis,
    Classification,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::InitialResponse => "initial response",
            Stage::Extraction => "assumption extraction",
            Stage::Verification => "verification",
            Stage::Synthesis => "synthesis",
            Stage::Classification => "classification",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model-query handle shared by all stages of a verifier.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
    usage: Arc<UsageTracker>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self {
            provider,
            config,
            usage: Arc::new(UsageTracker::new()),
        }
    }

    /// Issue one query and return the completion text.
    pub async fn query(&self, stage: Stage, prompt: &str) -> Result<String, ProviderError> {
        let started = Instant::now();
        let result = self
            .provider
            .complete(vec![ChatMessage::user(prompt)], &self.config)
            .await;

        match result {
            Ok(response) => {
                self.usage.record(stage, &response.usage);
                tracing::debug!(
                    stage = %stage,
                    provider = self.provider.name(),
                    model = %response.model,
                    tokens = response.usage.total(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Model query completed"
                );
                Ok(response.content)
            }
            Err(e) => {
                tracing::error!(
                    stage = %stage,
                    provider = self.provider.name(),
                    error = %e,
                    "Model query failed"
                );
                Err(e)
            }
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

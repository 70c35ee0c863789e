//! # factcheck-runtime
//!
//! Model- and search-backed half of the claim verification pipeline.
//!
//! Everything deterministic lives in `factcheck-core`. This crate adds the
//! parts that talk to the outside world:
//! - Model providers (Groq, OpenAI-compatible) and an optional completion cache
//! - Search backends (SerpAPI, DuckDuckGo) and the evidence gatherer
//! - Prompt templates for each stage
//! - The [`ClaimVerifier`] that drives a run
//!
//! ## Features
//!
//! HTTP clients are opt-in: `groq`, `serpapi`, `duckduckgo`, or
//! `all-providers`. Without them the corresponding providers report
//! `NotConfigured`, and the pipeline still runs against custom
//! [`LlmProvider`] and [`EvidenceSource`] implementations.
//!
//! ## Example
//!
//! ```rust,ignore
//! use factcheck_runtime::{ClaimVerifier, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_yaml_file("factcheck.yaml")?;
//! let verifier = ClaimVerifier::from_config(config)?;
//!
//! let report = verifier.verify("The Great Wall of China is visible from space").await;
//! println!("{}", report.to_json_pretty()?);
//! ```

pub mod config;
pub mod evidence;
pub mod observer;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod query;
pub mod resilience;
pub mod search;

pub use config::{CacheConfig, ConfigError, ModelConfig, PipelineConfig, RuntimeConfig, SearchConfig};
pub use evidence::{EvidenceError, EvidenceGatherer, EvidenceSource};
pub use observer::{
    PipelineEvent, PipelineObserver, RecordingObserver, SearchFailure, TracingObserver,
};
pub use pipeline::{AssumptionError, BuildError, ClaimVerifier, ClaimVerifierBuilder, PipelineError};
pub use prompts::{PromptOverrides, PromptSet, TemplateError};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
pub use query::{ModelClient, Stage};
pub use resilience::{CircuitBreakerConfig, UsageReport};
pub use search::{ProviderRecord, SearchBackend, SearchError};

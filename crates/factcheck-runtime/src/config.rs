//! Runtime configuration.
//!
//! Loaded from YAML; every section and field has a default, so an empty
//! document is a valid configuration. Durations are human-readable strings
//! (`"30s"`, `"1m 30s"`). API keys are not read from here: they come from
//! `GROQ_API_KEY` and `SEARCH_API_KEY`.
//!
//! ```yaml
//! model:
//!   provider: groq
//!   model: openai/gpt-oss-20b
//!   temperature: 0.3
//!   timeout: 30s
//! search:
//!   results_limit: 5
//! pipeline:
//!   max_concurrent_assumptions: 4
//! cache:
//!   enabled: true
//!   ttl: 1h
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::prompts::PromptOverrides;
use crate::providers::{CompletionConfig, DEFAULT_MODEL, GROQ_BASE_URL};
use crate::resilience::CircuitBreakerConfig;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
    pub prompts: PromptOverrides,
}

/// Model-query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Registered provider type
    pub provider: String,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Per-request timeout
    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub base_url: String,

    /// Retries for transient provider failures
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
            base_url: GROQ_BASE_URL.to_string(),
            max_retries: 2,
        }
    }
}

impl ModelConfig {
    /// Per-request settings handed to the provider.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
        }
    }

    /// Provider factory configuration.
    pub fn provider_json(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "base_url": self.base_url,
            "max_retries": self.max_retries,
        })
    }
}

/// Web search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum evidence records per assumption
    pub results_limit: usize,

    /// Paid backend, used when `SEARCH_API_KEY` is set
    pub paid_provider: String,

    /// Free backend, used otherwise
    pub free_provider: String,

    /// Per-request timeout
    #[serde(with = "duration_str")]
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_limit: 5,
            paid_provider: "serpapi".to_string(),
            free_provider: "duckduckgo".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Assumptions verified at once in stage 3; 1 is sequential
    pub max_concurrent_assumptions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_assumptions: 1,
        }
    }
}

/// In-memory completion cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    pub max_entries: u64,

    #[serde(with = "duration_str")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.results_limit == 0 {
            return Err(ConfigError::Invalid(
                "search.results_limit must be at least 1".to_string(),
            ));
        }
        if self.pipeline.max_concurrent_assumptions == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.max_concurrent_assumptions must be at least 1".to_string(),
            ));
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "circuit_breaker.failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_entries must be at least 1 when the cache is enabled".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model.model must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Serde adapter for `humantime` duration strings.
pub(crate) mod duration_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(D::Error::custom)
    }
}
